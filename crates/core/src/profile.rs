//! User profiles

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Identity record of a registered user
///
/// Keyed by [`UserId`]. The password is kept in plain text and compared by
/// equality; this mirrors a demo login, a real deployment delegates credential
/// checks to an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Contact email, used for password resets
    pub email: String,
    /// Date of birth (ISO date string as entered)
    pub dob: String,
    /// External identity
    pub aapar_id: UserId,
    /// Profile image reference (data URL or link)
    #[serde(default)]
    pub image_url: String,
    /// Signature image reference
    #[serde(default)]
    pub signature_url: String,
    /// Optional login password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserProfile {
    /// Create a profile with empty image references and no password
    pub fn new(
        aapar_id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        dob: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            dob: dob.into(),
            aapar_id: aapar_id.into(),
            image_url: String::new(),
            signature_url: String::new(),
            password: None,
        }
    }

    /// Set the login password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the image references
    pub fn with_images(mut self, image_url: impl Into<String>, signature_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self.signature_url = signature_url.into();
        self
    }

    /// Id of this profile
    pub fn id(&self) -> &UserId {
        &self.aapar_id
    }

    /// Check a login attempt against this profile
    ///
    /// No password supplied always passes. A supplied password passes only on
    /// exact equality; a profile without a stored password rejects any
    /// supplied one.
    pub fn accepts(&self, candidate: Option<&str>) -> bool {
        match candidate {
            None => true,
            Some(given) => self.password.as_deref() == Some(given),
        }
    }
}
