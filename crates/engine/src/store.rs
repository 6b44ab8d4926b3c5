//! Reactive document store
//!
//! [`DocumentStore`] holds every profile, document collection, notification
//! and event of a session, plus the id of the logged-in user.
//!
//! # Design
//!
//! State sits behind a single `RwLock`. Mutations take the write lock, change
//! the state, and release the lock before anything else happens. Then:
//!
//! 1. every listener is invoked, in registration order
//! 2. the durable snapshot is rewritten (unless disabled)
//!
//! Login and logout additionally rewrite the session tier while still
//! holding the lock, so it always matches the in-memory current user.
//! Because the lock is released before step 1, a listener can call the read
//! accessors (or even mutate the store) from inside its callback.
//!
//! Failed operations return a [`StoreError`] and leave state, listeners and
//! storage untouched. Persistence failures are logged and never surfaced.
//!
//! # Example
//!
//! ```ignore
//! let store = DocumentStore::in_memory();
//! store.register_user(UserProfile::new("1111-2222-3333", "Alice", "a@x.edu", "2003-04-05"));
//! store.set_current_user(&"1111-2222-3333".into(), None)?;
//! let id = store.add_file(DocumentCategory::Projects, FileUpload::pdf("report.pdf", bytes))?;
//! ```

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, warn};

use credstore_core::{
    AppEvent, DocumentCategory, EventDraft, EventId, FileId, FileStatus, FileUpload,
    Notification, NotificationId, Result, ReviewDecision, StoreError, StoredFile, UserFileStore,
    UserId, UserProfile,
};
use credstore_durability::{
    load_session, save_session, DurabilityError, FileStorage, KeyValueStorage, MemoryStorage,
    PersistedState,
};

use crate::config::StoreConfig;
use crate::subscribers::{SubscriberRegistry, Subscription};

/// Mutable state guarded by the store lock
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) persisted: PersistedState,
    pub(crate) current_user: Option<UserId>,
}

impl StoreState {
    pub(crate) fn user_files(&self, user_id: &UserId) -> Option<&UserFileStore> {
        self.persisted.file_store.get(user_id)
    }

    fn user_files_mut(&mut self, user_id: &UserId) -> Result<&mut UserFileStore> {
        self.persisted
            .file_store
            .get_mut(user_id)
            .ok_or_else(|| StoreError::UserNotFound(user_id.clone()))
    }

    fn current_user(&self) -> Result<UserId> {
        self.current_user.clone().ok_or(StoreError::NotLoggedIn)
    }
}

/// In-memory store of profiles, documents, notifications and events
pub struct DocumentStore {
    pub(crate) state: RwLock<StoreState>,
    subscribers: Arc<SubscriberRegistry>,
    durable: Arc<dyn KeyValueStorage>,
    session: Arc<dyn KeyValueStorage>,
    persist: bool,
}

impl DocumentStore {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Build a store over the given tiers, loading whatever they hold
    ///
    /// Unreadable snapshots are logged and start empty. Every loaded profile
    /// gets a file store entry.
    pub fn new(durable: Arc<dyn KeyValueStorage>, session: Arc<dyn KeyValueStorage>) -> Self {
        let persisted = PersistedState::load(durable.as_ref());
        let current_user = load_session(session.as_ref());
        debug!(
            target: "credstore::store",
            profiles = persisted.user_profiles.len(),
            events = persisted.events.len(),
            current_user = ?current_user,
            "Store loaded"
        );
        Self {
            state: RwLock::new(StoreState {
                persisted,
                current_user,
            }),
            subscribers: Arc::new(SubscriberRegistry::new()),
            durable,
            session,
            persist: true,
        }
    }

    /// Store with both tiers in process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Build a store from configuration
    ///
    /// With a data directory, the durable tier lives there and the session
    /// tier in its `session` subdirectory (or in memory when
    /// `persist_session` is off).
    pub fn open(config: &StoreConfig) -> std::result::Result<Self, DurabilityError> {
        let durable: Arc<dyn KeyValueStorage> = match &config.data_dir {
            Some(dir) => Arc::new(FileStorage::open(dir)?),
            None => Arc::new(MemoryStorage::new()),
        };
        let session: Arc<dyn KeyValueStorage> = match config.session_dir() {
            Some(dir) => Arc::new(FileStorage::open(dir)?),
            None => Arc::new(MemoryStorage::new()),
        };
        let mut store = Self::new(durable, session);
        store.persist = config.persist;
        Ok(store)
    }

    // =========================================================================
    // Change propagation
    // =========================================================================

    /// Register a change listener
    ///
    /// The listener runs after every successful mutation, with no arguments.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(listener))
    }

    /// Number of registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Run a mutation; on success broadcast and persist
    pub(crate) fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let value = {
            let mut state = self.state.write();
            f(&mut state)?
        };
        self.broadcast_change();
        Ok(value)
    }

    /// Run a mutation that cannot fail; broadcast and persist
    pub(crate) fn mutate_infallible<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let value = f(&mut *self.state.write());
        self.broadcast_change();
        value
    }

    fn broadcast_change(&self) {
        self.subscribers.broadcast();
        self.persist_durable();
    }

    fn persist_durable(&self) {
        if !self.persist {
            return;
        }
        let state = self.state.read();
        if let Err(e) = state.persisted.save(self.durable.as_ref()) {
            error!(target: "credstore::store", error = %e, "Failed to persist durable snapshot");
        }
    }

    fn persist_session(&self, current: Option<&UserId>) {
        if let Err(e) = save_session(self.session.as_ref(), current) {
            error!(target: "credstore::store", error = %e, "Failed to persist session");
        }
    }

    // =========================================================================
    // Profiles and session
    // =========================================================================

    /// Insert or overwrite a profile, creating its file store if absent
    ///
    /// Re-registering an id replaces the profile but keeps its documents.
    pub fn register_user(&self, profile: UserProfile) {
        let id = profile.aapar_id.clone();
        self.mutate_infallible(|state| {
            state.persisted.file_store.entry(id.clone()).or_default();
            state.persisted.user_profiles.insert(id.clone(), profile);
        });
        debug!(target: "credstore::store", user = %id, "User registered");
    }

    /// Log a user in
    ///
    /// Succeeds when the profile exists and, if a password is given, it
    /// equals the stored one. Unknown ids and wrong passwords both yield
    /// `InvalidCredentials` and leave the current user unchanged.
    pub fn set_current_user(&self, user_id: &UserId, password: Option<&str>) -> Result<()> {
        {
            let mut state = self.state.write();
            let accepted = state
                .persisted
                .user_profiles
                .get(user_id)
                .map_or(false, |p| p.accepts(password));
            if !accepted {
                warn!(target: "credstore::store", user = %user_id, "Attempted to log in with invalid credentials");
                return Err(StoreError::InvalidCredentials);
            }
            state.current_user = Some(user_id.clone());
            // Session tier is written under the guard
            self.persist_session(state.current_user.as_ref());
        }
        self.broadcast_change();
        debug!(target: "credstore::store", user = %user_id, "User logged in");
        Ok(())
    }

    /// Log the current user out
    pub fn logout_user(&self) {
        {
            let mut state = self.state.write();
            state.current_user = None;
            self.persist_session(None);
        }
        self.broadcast_change();
        debug!(target: "credstore::store", "User logged out");
    }

    /// Id of the logged-in user
    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.read().current_user.clone()
    }

    /// Profile of the logged-in user, if both exist
    pub fn current_user_profile(&self) -> Option<UserProfile> {
        let state = self.state.read();
        let id = state.current_user.as_ref()?;
        state.persisted.user_profiles.get(id).cloned()
    }

    /// Every registered profile, ordered by id
    pub fn all_user_profiles(&self) -> Vec<UserProfile> {
        self.state.read().persisted.user_profiles.values().cloned().collect()
    }

    /// Profile by id
    pub fn profile_by_id(&self, user_id: &UserId) -> Option<UserProfile> {
        self.state.read().persisted.user_profiles.get(user_id).cloned()
    }

    /// First profile with this email
    pub fn find_user_by_email(&self, email: &str) -> Option<UserProfile> {
        self.state
            .read()
            .persisted
            .user_profiles
            .values()
            .find(|p| p.email == email)
            .cloned()
    }

    /// Overwrite the password of the profile registered under `email`
    pub fn update_user_password(&self, email: &str, new_password: &str) -> Result<()> {
        self.mutate(|state| {
            let profile = state
                .persisted
                .user_profiles
                .values_mut()
                .find(|p| p.email == email)
                .ok_or_else(|| StoreError::EmailNotFound(email.to_string()))?;
            profile.password = Some(new_password.to_string());
            debug!(target: "credstore::store", user = %profile.aapar_id, "Password updated");
            Ok(())
        })
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Upload a document to the current user's collection
    ///
    /// The document starts `pending` with no signature, QR or event key.
    pub fn add_file(&self, category: DocumentCategory, upload: FileUpload) -> Result<FileId> {
        self.mutate(|state| {
            let user_id = state.current_user()?;
            let file = StoredFile::from_upload(upload, FileStatus::Pending);
            let id = file.id.clone();
            state.user_files_mut(&user_id)?.collection_mut(category).push(file);
            debug!(target: "credstore::store", user = %user_id, %category, file = %id, "File added");
            Ok(id)
        })
    }

    /// Issue a document to a student on behalf of an authority
    ///
    /// The document starts `approved`. For certificates `key` becomes the
    /// event key; for other categories it becomes the signature marker. The
    /// recipient is notified.
    pub fn issue_file_to_student(
        &self,
        user_id: &UserId,
        category: DocumentCategory,
        upload: FileUpload,
        key: &str,
    ) -> Result<FileId> {
        self.mutate(|state| {
            let files = state.user_files_mut(user_id)?;
            let mut file = StoredFile::from_upload(upload, FileStatus::Approved);
            if category == DocumentCategory::Certificates {
                file.event_key = Some(key.to_string());
            } else {
                file.signature = Some(key.to_string());
            }
            let id = file.id.clone();
            let message = format!(
                "A new document \"{}\" has been issued to you by an authority.",
                file.name
            );
            files.collection_mut(category).push(file);
            files.push_notification(Notification::new(message));
            debug!(target: "credstore::store", user = %user_id, %category, file = %id, "File issued");
            Ok(id)
        })
    }

    /// Documents of one collection; empty when the user is unknown
    pub fn files(&self, user_id: &UserId, category: DocumentCategory) -> Vec<StoredFile> {
        self.state
            .read()
            .user_files(user_id)
            .map(|f| f.collection(category).clone())
            .unwrap_or_default()
    }

    /// Delete a document from the current user's collection
    ///
    /// Only the current user's documents are reachable. `Ok(None)` when no
    /// document matched; the change is still broadcast.
    pub fn remove_file(&self, category: DocumentCategory, id: &FileId) -> Result<Option<StoredFile>> {
        self.mutate(|state| {
            let user_id = state.current_user()?;
            let removed = state.user_files_mut(&user_id)?.remove(category, id);
            debug!(
                target: "credstore::store",
                user = %user_id,
                %category,
                file = %id,
                removed = removed.is_some(),
                "File removal"
            );
            Ok(removed)
        })
    }

    /// Approve or reject a pending document and notify its owner
    ///
    /// Approved and rejected are terminal: reviewing them again fails with
    /// `AlreadyReviewed`.
    pub fn update_file_status(
        &self,
        user_id: &UserId,
        category: DocumentCategory,
        id: &FileId,
        decision: ReviewDecision,
    ) -> Result<()> {
        self.mutate(|state| {
            let files = state.user_files_mut(user_id)?;
            let file = files.find_mut(category, id).ok_or_else(|| StoreError::FileNotFound {
                category,
                id: id.clone(),
            })?;
            if file.status.is_terminal() {
                return Err(StoreError::AlreadyReviewed {
                    id: id.clone(),
                    status: file.status,
                });
            }
            file.status = decision.target_status();
            let message = decision.notification_message(&file.name);
            files.push_notification(Notification::new(message));
            debug!(target: "credstore::store", user = %user_id, file = %id, ?decision, "File reviewed");
            Ok(())
        })
        .map_err(|e| {
            warn!(target: "credstore::store", user = %user_id, file = %id, error = %e, "Review rejected");
            e
        })
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Prepend a notification to a user's list
    pub fn add_notification(&self, user_id: &UserId, message: impl Into<String>) -> Result<NotificationId> {
        let message = message.into();
        self.mutate(|state| {
            let notification = Notification::new(message);
            let id = notification.id.clone();
            state.user_files_mut(user_id)?.push_notification(notification);
            Ok(id)
        })
    }

    /// Notifications of a user, newest first; empty when unknown
    pub fn notifications(&self, user_id: &UserId) -> Vec<Notification> {
        self.state
            .read()
            .user_files(user_id)
            .map(|f| f.notifications.clone())
            .unwrap_or_default()
    }

    /// Mark every notification of a user as read
    ///
    /// Returns how many were unread before the call.
    pub fn mark_notifications_as_read(&self, user_id: &UserId) -> Result<usize> {
        self.mutate(|state| {
            let files = state.user_files_mut(user_id)?;
            let mut flipped = 0;
            for n in files.notifications.iter_mut().filter(|n| !n.read) {
                n.read = true;
                flipped += 1;
            }
            Ok(flipped)
        })
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register an event
    ///
    /// Key uniqueness is not enforced. A duplicate key is logged; lookups
    /// keep returning the earliest event with that key.
    pub fn add_event(&self, draft: EventDraft) -> Result<AppEvent> {
        draft.validate()?;
        self.mutate(|state| {
            if state.persisted.events.iter().any(|e| e.key == draft.key) {
                warn!(target: "credstore::store", key = %draft.key, "Event key already in use");
            }
            let event = draft.into_event();
            state.persisted.events.push(event.clone());
            debug!(target: "credstore::store", event = %event.id, key = %event.key, "Event added");
            Ok(event)
        })
    }

    /// All events in creation order
    pub fn events(&self) -> Vec<AppEvent> {
        self.state.read().persisted.events.clone()
    }

    /// First event with this key
    pub fn event_by_key(&self, key: &str) -> Option<AppEvent> {
        self.state
            .read()
            .persisted
            .events
            .iter()
            .find(|e| e.key == key)
            .cloned()
    }

    /// Delete an event by id
    pub fn remove_event(&self, id: &EventId) -> Result<AppEvent> {
        self.mutate(|state| {
            let events = &mut state.persisted.events;
            let index = events
                .iter()
                .position(|e| &e.id == id)
                .ok_or_else(|| StoreError::EventNotFound(id.clone()))?;
            let event = events.remove(index);
            debug!(target: "credstore::store", event = %id, "Event removed");
            Ok(event)
        })
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("DocumentStore")
            .field("profiles", &state.persisted.user_profiles.len())
            .field("events", &state.persisted.events.len())
            .field("current_user", &state.current_user)
            .field("subscribers", &self.subscribers.len())
            .field("persist", &self.persist)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ALICE: &str = "1111-2222-3333";
    const BOB: &str = "4444-5555-6666";

    fn alice() -> UserProfile {
        UserProfile::new(ALICE, "Alice", "alice@example.edu", "2003-04-05").with_password("pw-a")
    }

    fn bob() -> UserProfile {
        UserProfile::new(BOB, "Bob", "bob@example.edu", "2002-01-09").with_password("pw-b")
    }

    fn pdf(name: &str) -> FileUpload {
        FileUpload::pdf(name, b"%PDF-1.7".to_vec())
    }

    fn fest_draft() -> EventDraft {
        EventDraft {
            name: "Fest".into(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 3, 2, 18, 0, 0).unwrap(),
            key: "FEST24".into(),
            organizer: "Cultural Committee".into(),
            devops_link: "https://example.edu/fest".into(),
        }
    }

    fn setup() -> DocumentStore {
        let store = DocumentStore::in_memory();
        store.register_user(alice());
        store.register_user(bob());
        store
    }

    fn counting(store: &DocumentStore) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        store.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    fn uid(s: &str) -> UserId {
        UserId::new(s)
    }

    // ---------------------------------------------------------------------
    // Profiles and session
    // ---------------------------------------------------------------------

    #[test]
    fn test_register_creates_empty_file_store() {
        let store = setup();
        assert_eq!(store.profile_by_id(&uid(ALICE)), Some(alice()));
        for category in DocumentCategory::ALL {
            assert!(store.files(&uid(ALICE), category).is_empty());
        }
        assert!(store.notifications(&uid(ALICE)).is_empty());
    }

    #[test]
    fn test_reregister_overwrites_profile_keeps_files() {
        let store = setup();
        store.set_current_user(&uid(ALICE), Some("pw-a")).unwrap();
        store.add_file(DocumentCategory::Projects, pdf("p.pdf")).unwrap();

        let renamed = UserProfile { name: "Alice B.".into(), ..alice() };
        store.register_user(renamed.clone());

        assert_eq!(store.profile_by_id(&uid(ALICE)), Some(renamed));
        assert_eq!(store.files(&uid(ALICE), DocumentCategory::Projects).len(), 1);
        assert_eq!(store.all_user_profiles().len(), 2);
    }

    #[test]
    fn test_login_correct_then_wrong_password() {
        let store = setup();
        assert_eq!(store.set_current_user(&uid(ALICE), Some("pw-a")), Ok(()));
        assert_eq!(store.current_user_id(), Some(uid(ALICE)));

        assert_eq!(
            store.set_current_user(&uid(BOB), Some("wrong")),
            Err(StoreError::InvalidCredentials)
        );
        assert_eq!(store.current_user_id(), Some(uid(ALICE)));
    }

    #[test]
    fn test_login_unknown_user() {
        let store = setup();
        assert_eq!(
            store.set_current_user(&uid("nobody"), None),
            Err(StoreError::InvalidCredentials)
        );
        assert_eq!(store.current_user_id(), None);
    }

    #[test]
    fn test_login_without_password_skips_check() {
        let store = setup();
        store.set_current_user(&uid(BOB), None).unwrap();
        assert_eq!(store.current_user_profile().map(|p| p.name), Some("Bob".to_string()));
    }

    #[test]
    fn test_logout_clears_current_user() {
        let store = setup();
        store.set_current_user(&uid(ALICE), None).unwrap();
        store.logout_user();
        assert_eq!(store.current_user_id(), None);
        assert_eq!(store.current_user_profile(), None);
    }

    #[test]
    fn test_find_by_email_and_password_reset() {
        let store = setup();
        assert_eq!(store.find_user_by_email("bob@example.edu").map(|p| p.aapar_id), Some(uid(BOB)));
        assert_eq!(store.find_user_by_email("carol@example.edu"), None);

        store.update_user_password("bob@example.edu", "new-pw").unwrap();
        assert!(store.set_current_user(&uid(BOB), Some("pw-b")).is_err());
        assert!(store.set_current_user(&uid(BOB), Some("new-pw")).is_ok());

        assert_eq!(
            store.update_user_password("carol@example.edu", "x"),
            Err(StoreError::EmailNotFound("carol@example.edu".into()))
        );
    }

    // ---------------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------------

    #[test]
    fn test_add_file_requires_login() {
        let store = setup();
        assert_eq!(
            store.add_file(DocumentCategory::Certificates, pdf("c.pdf")),
            Err(StoreError::NotLoggedIn)
        );
    }

    #[test]
    fn test_add_file_appends_pending() {
        let store = setup();
        store.set_current_user(&uid(ALICE), None).unwrap();
        let before = store.files(&uid(ALICE), DocumentCategory::Certificates).len();

        let id = store.add_file(DocumentCategory::Certificates, pdf("c.pdf")).unwrap();

        let files = store.files(&uid(ALICE), DocumentCategory::Certificates);
        assert_eq!(files.len(), before + 1);
        let file = files.iter().find(|f| f.id == id).unwrap();
        assert_eq!(file.status, FileStatus::Pending);
        assert_eq!(file.signature, None);
        assert_eq!(file.qr_code, None);
        assert_eq!(file.event_key, None);
        assert_eq!(file.file.as_ref().map(|p| p.bytes().to_vec()), Some(b"%PDF-1.7".to_vec()));
    }

    #[test]
    fn test_issue_certificate_sets_event_key_and_notifies() {
        let store = setup();
        let id = store
            .issue_file_to_student(&uid(ALICE), DocumentCategory::Certificates, pdf("fest.pdf"), "FEST24")
            .unwrap();

        let files = store.files(&uid(ALICE), DocumentCategory::Certificates);
        let file = files.iter().find(|f| f.id == id).unwrap();
        assert_eq!(file.status, FileStatus::Approved);
        assert_eq!(file.event_key.as_deref(), Some("FEST24"));
        assert_eq!(file.signature, None);

        let notes = store.notifications(&uid(ALICE));
        assert_eq!(
            notes[0].message,
            "A new document \"fest.pdf\" has been issued to you by an authority."
        );
        assert!(!notes[0].read);
    }

    #[test]
    fn test_issue_other_category_sets_signature() {
        let store = setup();
        store
            .issue_file_to_student(&uid(BOB), DocumentCategory::Gradesheets, pdf("sem.pdf"), "sig-123")
            .unwrap();
        let file = &store.files(&uid(BOB), DocumentCategory::Gradesheets)[0];
        assert_eq!(file.signature.as_deref(), Some("sig-123"));
        assert_eq!(file.event_key, None);
    }

    #[test]
    fn test_issue_to_unknown_user() {
        let store = setup();
        let count = counting(&store);
        assert_eq!(
            store.issue_file_to_student(&uid("ghost"), DocumentCategory::Projects, pdf("x.pdf"), "k"),
            Err(StoreError::UserNotFound(uid("ghost")))
        );
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_files_of_unknown_user_is_empty() {
        let store = setup();
        assert!(store.files(&uid("ghost"), DocumentCategory::Projects).is_empty());
    }

    #[test]
    fn test_remove_file_only_touches_current_user() {
        let store = setup();
        store.set_current_user(&uid(BOB), None).unwrap();
        let bobs = store.add_file(DocumentCategory::Internship, pdf("bob.pdf")).unwrap();

        store.set_current_user(&uid(ALICE), None).unwrap();
        let alices = store.add_file(DocumentCategory::Internship, pdf("alice.pdf")).unwrap();

        assert_eq!(store.remove_file(DocumentCategory::Internship, &bobs), Ok(None));
        assert_eq!(store.files(&uid(BOB), DocumentCategory::Internship).len(), 1);

        let removed = store.remove_file(DocumentCategory::Internship, &alices).unwrap();
        assert_eq!(removed.map(|f| f.name), Some("alice.pdf".to_string()));
        assert!(store.files(&uid(ALICE), DocumentCategory::Internship).is_empty());
    }

    #[test]
    fn test_remove_file_wrong_category_is_noop() {
        let store = setup();
        store.set_current_user(&uid(ALICE), None).unwrap();
        let id = store.add_file(DocumentCategory::Projects, pdf("p.pdf")).unwrap();
        assert_eq!(store.remove_file(DocumentCategory::Gradesheets, &id), Ok(None));
        assert_eq!(store.files(&uid(ALICE), DocumentCategory::Projects).len(), 1);
    }

    #[test]
    fn test_review_approve_and_reject() {
        let store = setup();
        store.set_current_user(&uid(ALICE), None).unwrap();
        let a = store.add_file(DocumentCategory::Projects, pdf("a.pdf")).unwrap();
        let b = store.add_file(DocumentCategory::Projects, pdf("b.pdf")).unwrap();

        store
            .update_file_status(&uid(ALICE), DocumentCategory::Projects, &a, ReviewDecision::Approve)
            .unwrap();
        store
            .update_file_status(&uid(ALICE), DocumentCategory::Projects, &b, ReviewDecision::Reject)
            .unwrap();

        let files = store.files(&uid(ALICE), DocumentCategory::Projects);
        assert_eq!(files[0].status, FileStatus::Approved);
        assert_eq!(files[1].status, FileStatus::Rejected);

        let notes = store.notifications(&uid(ALICE));
        assert_eq!(notes[0].message, "Your document \"b.pdf\" has been rejected.");
        assert_eq!(notes[1].message, "Your document \"a.pdf\" has been verified.");
    }

    #[test]
    fn test_review_is_terminal() {
        let store = setup();
        let id = store
            .issue_file_to_student(&uid(ALICE), DocumentCategory::Projects, pdf("a.pdf"), "sig")
            .unwrap();
        assert_eq!(
            store.update_file_status(&uid(ALICE), DocumentCategory::Projects, &id, ReviewDecision::Reject),
            Err(StoreError::AlreadyReviewed {
                id: id.clone(),
                status: FileStatus::Approved
            })
        );
        assert_eq!(store.files(&uid(ALICE), DocumentCategory::Projects)[0].status, FileStatus::Approved);
    }

    #[test]
    fn test_review_missing_file() {
        let store = setup();
        let count = counting(&store);
        let missing = FileId::new("0-missing");
        assert_eq!(
            store.update_file_status(&uid(ALICE), DocumentCategory::Projects, &missing, ReviewDecision::Approve),
            Err(StoreError::FileNotFound {
                category: DocumentCategory::Projects,
                id: missing
            })
        );
        assert!(store.notifications(&uid(ALICE)).is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    #[test]
    fn test_mark_read_is_idempotent() {
        let store = setup();
        store.add_notification(&uid(ALICE), "one").unwrap();
        store.add_notification(&uid(ALICE), "two").unwrap();

        assert_eq!(store.mark_notifications_as_read(&uid(ALICE)), Ok(2));
        let first = store.notifications(&uid(ALICE));
        assert!(first.iter().all(|n| n.read));

        assert_eq!(store.mark_notifications_as_read(&uid(ALICE)), Ok(0));
        assert_eq!(store.notifications(&uid(ALICE)), first);
    }

    #[test]
    fn test_notifications_unknown_user() {
        let store = setup();
        assert!(store.notifications(&uid("ghost")).is_empty());
        assert!(store.add_notification(&uid("ghost"), "x").is_err());
        assert!(store.mark_notifications_as_read(&uid("ghost")).is_err());
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    #[test]
    fn test_event_lifecycle() {
        let store = setup();
        let event = store.add_event(fest_draft()).unwrap();
        assert_eq!(store.event_by_key("FEST24"), Some(event.clone()));
        assert_eq!(store.events().len(), 1);

        assert_eq!(store.remove_event(&event.id), Ok(event.clone()));
        assert_eq!(store.event_by_key("FEST24"), None);
        assert_eq!(store.remove_event(&event.id), Err(StoreError::EventNotFound(event.id)));
    }

    #[test]
    fn test_duplicate_event_key_first_wins() {
        let store = setup();
        let first = store.add_event(fest_draft()).unwrap();
        let second = store
            .add_event(EventDraft { name: "Fest (again)".into(), ..fest_draft() })
            .unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.event_by_key("FEST24").map(|e| e.id), Some(first.id));
    }

    #[test]
    fn test_invalid_event_draft_rejected_quietly() {
        let store = setup();
        let count = counting(&store);
        let draft = EventDraft { name: String::new(), ..fest_draft() };
        assert_eq!(store.add_event(draft), Err(StoreError::MissingEventField("name")));
        assert!(store.events().is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    // ---------------------------------------------------------------------
    // Broadcast
    // ---------------------------------------------------------------------

    #[test]
    fn test_every_mutation_broadcasts_once() {
        let store = setup();
        let count = counting(&store);

        store.set_current_user(&uid(ALICE), None).unwrap();
        let id = store.add_file(DocumentCategory::Projects, pdf("p.pdf")).unwrap();
        store.issue_file_to_student(&uid(BOB), DocumentCategory::Projects, pdf("q.pdf"), "s").unwrap();
        store.update_file_status(&uid(ALICE), DocumentCategory::Projects, &id, ReviewDecision::Approve).unwrap();
        store.mark_notifications_as_read(&uid(ALICE)).unwrap();
        store.remove_file(DocumentCategory::Projects, &id).unwrap();
        store.logout_user();

        assert_eq!(count.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_failed_login_does_not_broadcast() {
        let store = setup();
        let count = counting(&store);
        let _ = store.set_current_user(&uid(ALICE), Some("nope"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_callbacks() {
        let store = setup();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sub = store.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        store.logout_user();
        assert!(sub.unsubscribe());
        store.logout_user();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = Arc::new(setup());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let weak = Arc::downgrade(&store);
        let s = seen.clone();
        store.subscribe(move || {
            if let Some(store) = weak.upgrade() {
                s.lock().push(store.current_user_id());
            }
        });

        store.set_current_user(&uid(ALICE), None).unwrap();
        store.logout_user();
        assert_eq!(*seen.lock(), vec![Some(uid(ALICE)), None]);
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    #[test]
    fn test_durable_and_session_tiers_written() {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        let store = DocumentStore::new(durable.clone(), session.clone());
        store.register_user(alice());
        store.set_current_user(&uid(ALICE), None).unwrap();

        assert!(durable.get("userProfiles").unwrap().unwrap().contains(ALICE));
        assert_eq!(session.get("currentUserAaparId").unwrap().as_deref(), Some(ALICE));

        store.logout_user();
        assert_eq!(session.get("currentUserAaparId").unwrap(), None);
    }

    #[test]
    fn test_reload_restores_metadata_not_payload() {
        let durable = Arc::new(MemoryStorage::new());
        let session = Arc::new(MemoryStorage::new());
        {
            let store = DocumentStore::new(durable.clone(), session.clone());
            store.register_user(alice());
            store.set_current_user(&uid(ALICE), None).unwrap();
            store.add_file(DocumentCategory::Gradesheets, pdf("sem1.pdf")).unwrap();
            store.add_event(fest_draft()).unwrap();
        }

        let store = DocumentStore::new(durable, session);
        assert_eq!(store.current_user_id(), Some(uid(ALICE)));
        assert_eq!(store.profile_by_id(&uid(ALICE)), Some(alice()));
        let files = store.files(&uid(ALICE), DocumentCategory::Gradesheets);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "sem1.pdf");
        assert!(files[0].file.is_none());
        assert!(store.event_by_key("FEST24").is_some());
    }

    #[test]
    fn test_persist_disabled_skips_durable_writes() {
        let store = DocumentStore::open(&StoreConfig::in_memory().persist(false)).unwrap();
        store.register_user(alice());
        assert!(store.state.read().persisted.user_profiles.contains_key(&uid(ALICE)));
        assert!(store.durable.get("userProfiles").unwrap().is_none());
    }

    /// Storage whose every call fails
    struct FailingStorage;

    impl KeyValueStorage for FailingStorage {
        fn get(&self, _key: &str) -> credstore_durability::Result<Option<String>> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk unavailable").into())
        }

        fn set(&self, _key: &str, _value: &str) -> credstore_durability::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }

        fn remove(&self, _key: &str) -> credstore_durability::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_storage_failures_do_not_fail_operations() {
        let store = DocumentStore::new(Arc::new(FailingStorage), Arc::new(FailingStorage));
        let count = counting(&store);
        assert_eq!(store.current_user_id(), None);

        store.register_user(alice());
        assert_eq!(store.profile_by_id(&uid(ALICE)), Some(alice()));

        assert_eq!(store.set_current_user(&uid(ALICE), Some("pw-a")), Ok(()));
        assert_eq!(store.current_user_id(), Some(uid(ALICE)));

        let id = store.add_file(DocumentCategory::Projects, pdf("p.pdf")).unwrap();
        assert_eq!(store.files(&uid(ALICE), DocumentCategory::Projects)[0].id, id);

        store.logout_user();
        assert_eq!(store.current_user_id(), None);
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    /// Session tier that lets a logout on another thread race the login write
    struct RacingSession {
        inner: MemoryStorage,
        store: parking_lot::Mutex<Option<std::sync::Weak<DocumentStore>>>,
        logout: parking_lot::Mutex<Option<std::thread::JoinHandle<()>>>,
    }

    impl KeyValueStorage for RacingSession {
        fn get(&self, key: &str) -> credstore_durability::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> credstore_durability::Result<()> {
            if let Some(weak) = self.store.lock().take() {
                let (tx, rx) = std::sync::mpsc::channel();
                let handle = std::thread::spawn(move || {
                    if let Some(store) = weak.upgrade() {
                        store.logout_user();
                    }
                    let _ = tx.send(());
                });
                // Give the logout a chance to finish before this write lands
                let _ = rx.recv_timeout(std::time::Duration::from_millis(200));
                *self.logout.lock() = Some(handle);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> credstore_durability::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_session_tier_matches_memory_after_concurrent_logout() {
        let session = Arc::new(RacingSession {
            inner: MemoryStorage::new(),
            store: parking_lot::Mutex::new(None),
            logout: parking_lot::Mutex::new(None),
        });
        let store = Arc::new(DocumentStore::new(Arc::new(MemoryStorage::new()), session.clone()));
        store.register_user(alice());
        *session.store.lock() = Some(Arc::downgrade(&store));

        store.set_current_user(&uid(ALICE), None).unwrap();
        let handle = session.logout.lock().take().unwrap();
        handle.join().unwrap();

        let persisted = load_session(&session.inner);
        assert_eq!(store.current_user_id(), None);
        assert_eq!(persisted, store.current_user_id());
    }
}
