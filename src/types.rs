//! Public types for the credstore API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Store and configuration
// ============================================================================

pub use credstore_engine::{ConfigError, DocumentStore, StoreConfig, StoreStats};

// Change propagation
pub use credstore_engine::{SubscriberId, Subscription};

// ============================================================================
// Domain types
// ============================================================================

// Identifiers
pub use credstore_core::{EventId, FileId, NotificationId, UserId};

// Profiles
pub use credstore_core::UserProfile;

// Documents and notifications
pub use credstore_core::{
    DocumentCategory, FilePayload, FileStatus, FileUpload, Notification, ReviewDecision,
    StoredFile, UserFileStore,
};

// Events
pub use credstore_core::{AppEvent, EventDraft};

// Authorities
pub use credstore_core::{AuthorityKind, AuthorityRole, Permission, Permissions};

// Errors
pub use credstore_core::{Result, StoreError};

// ============================================================================
// Persistence
// ============================================================================

pub use credstore_durability::{DurabilityError, FileStorage, KeyValueStorage, MemoryStorage};
