//! Role-checked operations for authorities
//!
//! Authorities (admins, faculty, organizers) act on other users' documents
//! and on the event list. Each operation here checks the acting
//! [`AuthorityRole`] before delegating to the unchecked store operation, so
//! a denied request never touches state or listeners.
//!
//! | Operation | Permission |
//! |-----------|------------|
//! | [`DocumentStore::issue_verified_document`] | issue certificates |
//! | [`DocumentStore::review_file_as`] | approve certificates |
//! | [`DocumentStore::add_event_as`] | create events |
//! | [`DocumentStore::remove_event_as`] | delete events |

use tracing::warn;

use credstore_core::{
    AppEvent, AuthorityRole, DocumentCategory, EventDraft, EventId, FileId, FileUpload,
    Permission, Result, ReviewDecision, StoreError, UserId,
};

use crate::store::DocumentStore;

impl DocumentStore {
    /// Check an issuance request without issuing anything
    ///
    /// The key and file name must be non-empty and the upload must be a PDF.
    /// Certificates must carry the key of a registered event.
    pub fn validate_issuance(
        &self,
        category: DocumentCategory,
        upload: &FileUpload,
        key: &str,
    ) -> Result<()> {
        if key.trim().is_empty() {
            return Err(StoreError::MissingIssuanceField("key"));
        }
        if upload.name.trim().is_empty() {
            return Err(StoreError::MissingIssuanceField("file"));
        }
        if !upload.is_pdf() {
            return Err(StoreError::UnsupportedContentType(upload.content_type.clone()));
        }
        if category == DocumentCategory::Certificates && self.event_by_key(key).is_none() {
            return Err(StoreError::UnknownEventKey(key.to_string()));
        }
        Ok(())
    }

    /// Issue a validated document on behalf of `issuer`
    pub fn issue_verified_document(
        &self,
        issuer: &AuthorityRole,
        user_id: &UserId,
        category: DocumentCategory,
        upload: FileUpload,
        key: &str,
    ) -> Result<FileId> {
        checked(issuer, Permission::IssueCertificates)?;
        self.validate_issuance(category, &upload, key)
            .map_err(|e| {
                warn!(target: "credstore::store", user = %user_id, error = %e, "Issuance rejected");
                e
            })?;
        self.issue_file_to_student(user_id, category, upload, key)
    }

    /// Review a pending document on behalf of `reviewer`
    pub fn review_file_as(
        &self,
        reviewer: &AuthorityRole,
        user_id: &UserId,
        category: DocumentCategory,
        id: &FileId,
        decision: ReviewDecision,
    ) -> Result<()> {
        checked(reviewer, Permission::ApproveCertificates)?;
        self.update_file_status(user_id, category, id, decision)
    }

    /// Register an event on behalf of `organizer`
    pub fn add_event_as(&self, organizer: &AuthorityRole, draft: EventDraft) -> Result<AppEvent> {
        checked(organizer, Permission::CreateEvents)?;
        self.add_event(draft)
    }

    /// Delete an event on behalf of `actor`
    pub fn remove_event_as(&self, actor: &AuthorityRole, id: &EventId) -> Result<AppEvent> {
        checked(actor, Permission::DeleteEvents)?;
        self.remove_event(id)
    }
}

fn checked(role: &AuthorityRole, permission: Permission) -> Result<()> {
    role.require(permission).map_err(|e| {
        warn!(target: "credstore::store", kind = %role.kind, %permission, "Permission denied");
        e
    })
}
