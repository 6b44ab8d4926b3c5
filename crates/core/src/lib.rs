//! Core types for credstore
//!
//! This crate defines the domain model shared by every other crate:
//! - Identifiers: UserId, FileId, NotificationId, EventId
//! - Profiles: UserProfile
//! - Documents: DocumentCategory, FileStatus, StoredFile, UserFileStore, Notification
//! - Events: AppEvent, EventDraft
//! - Roles: AuthorityKind, AuthorityRole, Permissions
//! - Errors: StoreError

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod event;
pub mod profile;
pub mod roles;
pub mod types;

pub use document::{
    DocumentCategory, FilePayload, FileStatus, FileUpload, Notification, ReviewDecision,
    StoredFile, UserFileStore,
};
pub use error::{Result, StoreError};
pub use event::{AppEvent, EventDraft};
pub use profile::UserProfile;
pub use roles::{AuthorityKind, AuthorityRole, Permission, Permissions};
pub use types::{EventId, FileId, NotificationId, UserId};
