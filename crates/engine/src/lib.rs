//! Engine layer for credstore
//!
//! This crate hosts the [`DocumentStore`]: the single source of truth for
//! profiles, documents, notifications and events during a session.
//!
//! - `store`: state, mutations and read accessors
//! - `subscribers`: listener registry and broadcast
//! - `authority`: role-checked issuance, review and event management
//! - `stats`: derived read models
//! - `config`: [`StoreConfig`] and TOML loading
//!
//! Every successful mutation runs in two steps: listeners are invoked in
//! registration order, then the durable snapshot is rewritten.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod authority;
pub mod config;
pub mod stats;
pub mod store;
pub mod subscribers;

pub use config::{ConfigError, StoreConfig};
pub use stats::StoreStats;
pub use store::DocumentStore;
pub use subscribers::{Listener, SubscriberId, SubscriberRegistry, Subscription};
