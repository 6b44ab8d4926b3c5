//! credstore: a reactive credential document store
//!
//! Users own four document collections (certificates, internship letters,
//! gradesheets, project reports) and a notification list. Authorities issue
//! and review documents and manage events. Every change is broadcast to
//! subscribers and mirrored to a durable key-value tier; the logged-in user
//! lives in a separate session tier.
//!
//! # Quick Start
//!
//! ```ignore
//! use credstore::{DocumentCategory, DocumentStore, FileUpload, UserProfile};
//!
//! let store = DocumentStore::in_memory();
//! store.register_user(UserProfile::new("1111-2222-3333", "Alice", "alice@example.edu", "2003-04-05"));
//! store.set_current_user(&"1111-2222-3333".into(), None)?;
//!
//! let sub = store.subscribe(|| println!("changed"));
//! store.add_file(DocumentCategory::Projects, FileUpload::pdf("report.pdf", bytes))?;
//! sub.unsubscribe();
//! ```
//!
//! # Crates
//!
//! - `credstore-core`: domain types and [`StoreError`]
//! - `credstore-durability`: [`KeyValueStorage`] backends and snapshot codecs
//! - `credstore-engine`: [`DocumentStore`], subscribers and configuration

#![warn(missing_docs)]

pub mod types;

pub use types::*;
