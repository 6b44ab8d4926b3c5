//! Snapshot codecs for the two persistence tiers
//!
//! Durable tier, one JSON document per key:
//!
//! | Key | Contents |
//! |-----|----------|
//! | `userProfiles` | object: user id → profile |
//! | `fileStore` | object: user id → documents + notifications (no payloads) |
//! | `events` | array of events |
//!
//! Session tier: `currentUserAaparId` holds the logged-in user id as a plain
//! string and is removed on logout.
//!
//! Loading is forgiving: a key that is missing or fails to decode is logged
//! and treated as empty, so one corrupt snapshot never blocks the others.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, error};

use credstore_core::{AppEvent, UserFileStore, UserId, UserProfile};

use crate::storage::{KeyValueStorage, Result};

/// Durable key for profiles
pub const USER_PROFILES_KEY: &str = "userProfiles";
/// Durable key for per-user documents
pub const FILE_STORE_KEY: &str = "fileStore";
/// Durable key for events
pub const EVENTS_KEY: &str = "events";
/// Session key for the logged-in user id
pub const CURRENT_USER_KEY: &str = "currentUserAaparId";

/// Everything the durable tier holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    /// Profiles by user id
    pub user_profiles: BTreeMap<UserId, UserProfile>,
    /// Documents and notifications by user id
    pub file_store: BTreeMap<UserId, UserFileStore>,
    /// Events in creation order
    pub events: Vec<AppEvent>,
}

impl PersistedState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Write all three durable keys
    ///
    /// Document payloads are never written (the field is skipped by serde).
    pub fn save(&self, storage: &dyn KeyValueStorage) -> Result<()> {
        let profiles = serde_json::to_string(&self.user_profiles)?;
        let files = serde_json::to_string(&self.file_store)?;
        let events = serde_json::to_string(&self.events)?;

        storage.set(USER_PROFILES_KEY, &profiles)?;
        storage.set(FILE_STORE_KEY, &files)?;
        storage.set(EVENTS_KEY, &events)?;
        debug!(
            target: "credstore::durability",
            profiles = self.user_profiles.len(),
            events = self.events.len(),
            "Durable snapshot written"
        );
        Ok(())
    }

    /// Read the durable keys, tolerating missing or corrupt entries
    ///
    /// Every loaded profile is guaranteed a file store entry.
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        let mut state = Self {
            user_profiles: load_key(storage, USER_PROFILES_KEY),
            file_store: load_key(storage, FILE_STORE_KEY),
            events: load_key(storage, EVENTS_KEY),
        };
        state.ensure_file_stores();
        state
    }

    /// Give every profile an empty file store if it lacks one
    pub fn ensure_file_stores(&mut self) {
        for id in self.user_profiles.keys() {
            self.file_store.entry(id.clone()).or_default();
        }
    }

    /// Copy of this state with all document payloads dropped
    pub fn without_payloads(&self) -> Self {
        Self {
            user_profiles: self.user_profiles.clone(),
            file_store: self
                .file_store
                .iter()
                .map(|(id, files)| (id.clone(), files.without_payloads()))
                .collect(),
            events: self.events.clone(),
        }
    }
}

fn load_key<T: DeserializeOwned + Default>(storage: &dyn KeyValueStorage, key: &str) -> T {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            error!(target: "credstore::durability", key, error = %e, "Failed to read snapshot");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            error!(target: "credstore::durability", key, error = %e, "Failed to parse snapshot");
            T::default()
        }
    }
}

/// Write (or clear) the session tier
pub fn save_session(storage: &dyn KeyValueStorage, current: Option<&UserId>) -> Result<()> {
    match current {
        Some(id) => storage.set(CURRENT_USER_KEY, id.as_str()),
        None => storage.remove(CURRENT_USER_KEY),
    }
}

/// Read the session tier
pub fn load_session(storage: &dyn KeyValueStorage) -> Option<UserId> {
    match storage.get(CURRENT_USER_KEY) {
        Ok(Some(id)) if !id.is_empty() => Some(UserId::new(id)),
        Ok(_) => None,
        Err(e) => {
            error!(target: "credstore::durability", error = %e, "Failed to read session");
            None
        }
    }
}
