//! Error types for store operations
//!
//! Every operation on the document store fails quietly: nothing panics and
//! in-memory state is left untouched. The variants below name the reason so
//! that callers can tell "nothing to do" apart from "not allowed".

use thiserror::Error;

use crate::document::{DocumentCategory, FileStatus};
use crate::roles::{AuthorityKind, Permission};
use crate::types::{EventId, FileId, UserId};

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Reasons a store operation did not take effect
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Login attempted with an unknown id or a wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Operation needs a logged-in user and there is none
    #[error("no user is logged in")]
    NotLoggedIn,

    /// No profile or file store exists for this id
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No profile has this email address
    #[error("no user registered with email {0}")]
    EmailNotFound(String),

    /// Document id not present in the named collection
    #[error("file {id} not found in {category}")]
    FileNotFound {
        /// Collection that was searched
        category: DocumentCategory,
        /// Id that was looked up
        id: FileId,
    },

    /// Event id not present
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Review requested for a document that already left `pending`
    #[error("file {id} was already reviewed (status {status})")]
    AlreadyReviewed {
        /// Document id
        id: FileId,
        /// Current terminal status
        status: FileStatus,
    },

    /// Certificate issuance with a key that matches no event
    #[error("no event registered with key {0}")]
    UnknownEventKey(String),

    /// Issuance request missing a required field
    #[error("missing issuance field: {0}")]
    MissingIssuanceField(&'static str),

    /// Issued documents must be PDFs
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Event draft missing a required field
    #[error("missing event field: {0}")]
    MissingEventField(&'static str),

    /// Event ends before it starts
    #[error("event ends before it starts")]
    InvalidEventRange,

    /// Authority role lacks the permission for this operation
    #[error("{kind} is not allowed to {permission}")]
    PermissionDenied {
        /// Role that attempted the operation
        kind: AuthorityKind,
        /// Permission that was required
        permission: Permission,
    },

    /// String did not name a document category
    #[error("unknown document category: {0}")]
    UnknownCategory(String),

    /// String did not name a review decision
    #[error("unknown review decision: {0}")]
    UnknownDecision(String),

    /// String did not name an authority kind
    #[error("unknown authority kind: {0}")]
    UnknownAuthorityKind(String),
}

impl StoreError {
    /// True for errors that mean "entity absent" rather than "rejected"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::UserNotFound(_)
                | StoreError::EmailNotFound(_)
                | StoreError::FileNotFound { .. }
                | StoreError::EventNotFound(_)
        )
    }
}
