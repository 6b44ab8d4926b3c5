//! Identifier types
//!
//! User ids come from outside (the registration form supplies them). File,
//! notification and event ids are generated locally as
//! `<unix-millis>-<random hex>`: unlikely to collide, not collision-proof.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the id, returning the inner string
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// External identity of a registered user (the `aaparId` of a profile)
    UserId
);

string_id!(
    /// Id of a stored document
    FileId
);

string_id!(
    /// Id of a notification
    NotificationId
);

string_id!(
    /// Id of an event
    EventId
);

/// Build a `<unix-millis>-<random>` id string
pub(crate) fn generate_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", millis, &random[..12])
}

impl FileId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        Self(generate_id())
    }
}

impl NotificationId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        Self(generate_id())
    }
}

impl EventId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        Self(generate_id())
    }
}
