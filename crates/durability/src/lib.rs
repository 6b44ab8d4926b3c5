//! Durability layer for credstore
//!
//! This crate provides the two persistence tiers behind the document store:
//! - `storage`: the [`KeyValueStorage`] trait with in-memory and on-disk backends
//! - `snapshot`: whole-state JSON snapshots written under fixed keys
//!
//! Every write replaces the previous snapshot wholesale. There is no
//! incremental diffing and no schema versioning.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod snapshot;
pub mod storage;

pub use snapshot::{
    load_session, save_session, PersistedState, CURRENT_USER_KEY, EVENTS_KEY, FILE_STORE_KEY,
    USER_PROFILES_KEY,
};
pub use storage::{DurabilityError, FileStorage, KeyValueStorage, MemoryStorage, Result};
