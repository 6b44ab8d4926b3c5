//! Events and their verification keys
//!
//! An [`AppEvent`] carries a key that certificate issuers quote to tie a
//! certificate to the event. Keys are expected to be unique but nothing
//! enforces it; lookups return the first event with a matching key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::types::EventId;

/// An event registered by an authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEvent {
    /// Event id
    pub id: EventId,
    /// Event name
    pub name: String,
    /// Start of the event
    pub start_date: DateTime<Utc>,
    /// End of the event
    pub end_date: DateTime<Utc>,
    /// Verification key quoted on issued certificates
    pub key: String,
    /// Organizing body
    pub organizer: String,
    /// External reference link
    pub devops_link: String,
}

/// An event before it has been assigned an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Event name
    pub name: String,
    /// Start of the event
    pub start_date: DateTime<Utc>,
    /// End of the event
    pub end_date: DateTime<Utc>,
    /// Verification key
    pub key: String,
    /// Organizing body
    pub organizer: String,
    /// External reference link
    pub devops_link: String,
}

impl EventDraft {
    /// Check that every field is filled and the range is ordered
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("name", &self.name),
            ("key", &self.key),
            ("organizer", &self.organizer),
            ("devopsLink", &self.devops_link),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(StoreError::MissingEventField(field));
        }
        if self.end_date < self.start_date {
            return Err(StoreError::InvalidEventRange);
        }
        Ok(())
    }

    /// Attach a fresh id
    pub fn into_event(self) -> AppEvent {
        AppEvent {
            id: EventId::generate(),
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            key: self.key,
            organizer: self.organizer,
            devops_link: self.devops_link,
        }
    }
}
