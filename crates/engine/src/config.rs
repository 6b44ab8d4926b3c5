//! Store configuration
//!
//! Read from `credstore.toml`:
//!
//! ```toml
//! data_dir = "/var/lib/credstore"   # omit for an in-memory store
//! persist = true                    # write the durable snapshot on change
//! persist_session = true            # keep the logged-in user across restarts
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`StoreConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// How a [`DocumentStore`](crate::DocumentStore) persists its state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory for the durable tier; `None` keeps everything in memory
    pub data_dir: Option<PathBuf>,
    /// Write the durable snapshot after every mutation
    pub persist: bool,
    /// Keep the session tier on disk (under `<data_dir>/session`)
    pub persist_session: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            persist: true,
            persist_session: true,
        }
    }
}

impl StoreConfig {
    /// Conventional config file name inside a data directory
    pub const FILE_NAME: &'static str = "credstore.toml";

    /// Configuration for a purely in-memory store
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Configuration for a store rooted at `dir`
    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Enable or disable durable writes
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Enable or disable the on-disk session tier
    pub fn persist_session(mut self, persist_session: bool) -> Self {
        self.persist_session = persist_session;
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Directory of the on-disk session tier, if any
    pub fn session_dir(&self) -> Option<PathBuf> {
        match (&self.data_dir, self.persist_session) {
            (Some(dir), true) => Some(dir.join("session")),
            _ => None,
        }
    }
}
