//! Key-value storage backends
//!
//! - `memory`: process-local map (tests, session tier of embedded use)
//! - `file`: one `<key>.json` file per key inside a directory
//!
//! Both tiers of the store (durable and session) speak the same
//! [`KeyValueStorage`] interface: string keys, string values.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, DurabilityError>;

/// Storage failures
#[derive(Debug, Error)]
pub enum DurabilityError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key contains characters that cannot name a file
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// String key-value store
///
/// Implementations must be usable from any thread. Writes overwrite the
/// previous value; removing an absent key succeeds.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
