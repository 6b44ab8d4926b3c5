//! Document types
//!
//! A user's documents live in four typed collections (one per
//! [`DocumentCategory`]) next to that user's notification list. Together
//! they form a [`UserFileStore`].
//!
//! ## Status machine
//!
//! ```text
//! pending ──approve──▶ approved
//!    │
//!    └────reject────▶ rejected
//! ```
//!
//! Both outcomes are terminal. Self-uploaded documents start `pending`;
//! authority-issued documents start `approved`.
//!
//! ## Payloads
//!
//! The binary content of a document ([`FilePayload`]) is held in memory only.
//! It is skipped during serialization, so a reloaded store keeps document
//! metadata but not content.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::StoreError;
use crate::types::{FileId, NotificationId};

/// One of the four document collections a user owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    /// Event participation certificates (validated by event key)
    Certificates,
    /// Internship letters
    Internship,
    /// Semester gradesheets
    Gradesheets,
    /// Project reports
    Projects,
}

impl DocumentCategory {
    /// All categories in display order
    pub const ALL: [DocumentCategory; 4] = [
        DocumentCategory::Certificates,
        DocumentCategory::Internship,
        DocumentCategory::Gradesheets,
        DocumentCategory::Projects,
    ];

    /// Wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Certificates => "certificates",
            DocumentCategory::Internship => "internship",
            DocumentCategory::Gradesheets => "gradesheets",
            DocumentCategory::Projects => "projects",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StoreError::UnknownCategory(s.to_string()))
    }
}

/// Review status of a stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Uploaded by the student, awaiting review
    Pending,
    /// Verified by an authority
    Approved,
    /// Rejected by an authority
    Rejected,
}

impl FileStatus {
    /// Whether the status accepts no further review
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FileStatus::Pending)
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Approved => "approved",
            FileStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome an authority may assign to a pending document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewDecision {
    /// Move to `approved`
    Approve,
    /// Move to `rejected`
    Reject,
}

impl ReviewDecision {
    /// Status the document ends up in
    pub fn target_status(&self) -> FileStatus {
        match self {
            ReviewDecision::Approve => FileStatus::Approved,
            ReviewDecision::Reject => FileStatus::Rejected,
        }
    }

    /// Notification text sent to the document owner
    pub fn notification_message(&self, file_name: &str) -> String {
        match self {
            ReviewDecision::Approve => format!("Your document \"{}\" has been verified.", file_name),
            ReviewDecision::Reject => format!("Your document \"{}\" has been rejected.", file_name),
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" | "approved" => Ok(ReviewDecision::Approve),
            "reject" | "rejected" => Ok(ReviewDecision::Reject),
            other => Err(StoreError::UnknownDecision(other.to_string())),
        }
    }
}

/// A file as handed to the store by an uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name
    pub name: String,
    /// MIME type reported by the uploader
    pub content_type: String,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Create an upload
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Shorthand for a PDF upload
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, "application/pdf", bytes)
    }

    /// Whether the upload declares itself a PDF
    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf"
    }
}

/// In-memory content of a stored document
///
/// Cheap to clone (shared bytes). Never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePayload {
    content_type: String,
    bytes: Arc<[u8]>,
}

impl FilePayload {
    /// MIME type of the content
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw content
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for FilePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePayload")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A document record owned by one user's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Document id
    pub id: FileId,
    /// File name as uploaded
    pub name: String,
    /// Upload date
    pub date: NaiveDate,
    /// Content; absent after a reload from durable storage
    #[serde(skip)]
    pub file: Option<FilePayload>,
    /// Review status
    pub status: FileStatus,
    /// Issuer signature marker (authority-issued non-certificates)
    pub signature: Option<String>,
    /// QR code reference
    pub qr_code: Option<String>,
    /// Event key binding an issued certificate to an event
    pub event_key: Option<String>,
}

impl StoredFile {
    /// Build a record from an upload with a fresh id and today's date
    pub fn from_upload(upload: FileUpload, status: FileStatus) -> Self {
        let payload = FilePayload {
            content_type: upload.content_type,
            bytes: Arc::from(upload.bytes),
        };
        Self {
            id: FileId::generate(),
            name: upload.name,
            date: Utc::now().date_naive(),
            file: Some(payload),
            status,
            signature: None,
            qr_code: None,
            event_key: None,
        }
    }

    /// Copy of this record with the content dropped
    pub fn without_payload(&self) -> Self {
        Self {
            file: None,
            ..self.clone()
        }
    }
}

/// A message to a user about one of their documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification id
    pub id: NotificationId,
    /// Human-readable text
    pub message: String,
    /// Whether the user has seen it
    pub read: bool,
    /// Creation time
    pub date: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification stamped now
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::generate(),
            message: message.into(),
            read: false,
            date: Utc::now(),
        }
    }
}

/// All documents and notifications of one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFileStore {
    /// Certificates collection
    #[serde(default)]
    pub certificates: Vec<StoredFile>,
    /// Internship collection
    #[serde(default)]
    pub internship: Vec<StoredFile>,
    /// Gradesheets collection
    #[serde(default)]
    pub gradesheets: Vec<StoredFile>,
    /// Projects collection
    #[serde(default)]
    pub projects: Vec<StoredFile>,
    /// Notifications, newest first
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl UserFileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a collection
    pub fn collection(&self, category: DocumentCategory) -> &Vec<StoredFile> {
        match category {
            DocumentCategory::Certificates => &self.certificates,
            DocumentCategory::Internship => &self.internship,
            DocumentCategory::Gradesheets => &self.gradesheets,
            DocumentCategory::Projects => &self.projects,
        }
    }

    /// Mutably borrow a collection
    pub fn collection_mut(&mut self, category: DocumentCategory) -> &mut Vec<StoredFile> {
        match category {
            DocumentCategory::Certificates => &mut self.certificates,
            DocumentCategory::Internship => &mut self.internship,
            DocumentCategory::Gradesheets => &mut self.gradesheets,
            DocumentCategory::Projects => &mut self.projects,
        }
    }

    /// Find a document in a collection
    pub fn find_mut(&mut self, category: DocumentCategory, id: &FileId) -> Option<&mut StoredFile> {
        self.collection_mut(category).iter_mut().find(|f| &f.id == id)
    }

    /// Remove a document from a collection, returning it if present
    pub fn remove(&mut self, category: DocumentCategory, id: &FileId) -> Option<StoredFile> {
        let files = self.collection_mut(category);
        let index = files.iter().position(|f| &f.id == id)?;
        Some(files.remove(index))
    }

    /// Prepend a notification
    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    /// Iterate every document across all collections
    pub fn all_files(&self) -> impl Iterator<Item = &StoredFile> {
        DocumentCategory::ALL
            .into_iter()
            .flat_map(move |c| self.collection(c).iter())
    }

    /// Copy of this store with every document's content dropped
    pub fn without_payloads(&self) -> Self {
        let strip = |files: &Vec<StoredFile>| -> Vec<StoredFile> {
            files.iter().map(StoredFile::without_payload).collect()
        };
        Self {
            certificates: strip(&self.certificates),
            internship: strip(&self.internship),
            gradesheets: strip(&self.gradesheets),
            projects: strip(&self.projects),
            notifications: self.notifications.clone(),
        }
    }
}
