//! Derived read models
//!
//! Nothing here mutates the store or triggers listeners.

use serde::Serialize;
use std::collections::BTreeMap;

use credstore_core::{DocumentCategory, FileStatus, StoredFile, UserId};

use crate::store::DocumentStore;

/// Counts across the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Registered profiles
    pub profiles: usize,
    /// Documents awaiting review
    pub pending: usize,
    /// Approved documents
    pub approved: usize,
    /// Rejected documents
    pub rejected: usize,
    /// Unread notifications across all users
    pub unread_notifications: usize,
    /// Registered events
    pub events: usize,
}

impl StoreStats {
    /// Documents in any status
    pub fn total_documents(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

impl DocumentStore {
    /// Every collection of a user, keyed by category
    ///
    /// Unknown users yield four empty collections.
    pub fn documents_by_category(&self, user_id: &UserId) -> BTreeMap<DocumentCategory, Vec<StoredFile>> {
        let state = self.state.read();
        let files = state.user_files(user_id);
        DocumentCategory::ALL
            .into_iter()
            .map(|c| {
                let docs = files.map(|f| f.collection(c).clone()).unwrap_or_default();
                (c, docs)
            })
            .collect()
    }

    /// Unread notifications of a user
    pub fn unread_notification_count(&self, user_id: &UserId) -> usize {
        self.state
            .read()
            .user_files(user_id)
            .map_or(0, |f| f.notifications.iter().filter(|n| !n.read).count())
    }

    /// Store-wide counts
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        let mut stats = StoreStats {
            profiles: state.persisted.user_profiles.len(),
            events: state.persisted.events.len(),
            ..StoreStats::default()
        };
        for files in state.persisted.file_store.values() {
            for file in files.all_files() {
                match file.status {
                    FileStatus::Pending => stats.pending += 1,
                    FileStatus::Approved => stats.approved += 1,
                    FileStatus::Rejected => stats.rejected += 1,
                }
            }
            stats.unread_notifications += files.notifications.iter().filter(|n| !n.read).count();
        }
        stats
    }
}
