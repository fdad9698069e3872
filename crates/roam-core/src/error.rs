//! Error types for roam-core

use thiserror::Error;

/// Result type alias using roam-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in roam-core operations
///
/// Denied capabilities and unresolved locations are not errors; they are
/// reported as [`crate::CapabilityState::Denied`] and
/// [`crate::location::LocationOutcome::Unresolved`].
#[derive(Error, Debug)]
pub enum Error {
    /// The persisted entry blob exists but could not be parsed
    #[error("Stored diary entries are unreadable: {0}")]
    StorageReadCorrupt(String),

    /// The entry blob could not be written
    #[error("Failed to persist diary entries: {0}")]
    StorageWriteFailed(String),

    /// `remove_at` was given a position outside the list
    #[error("Entry index {index} is out of range (list has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    /// Commit was requested while the draft is incomplete
    #[error("Draft is not ready to save: missing {0}")]
    NotReady(String),

    /// An entry failed validation
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A platform collaborator (camera, gallery, GPS, geocoder, notifier) failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
