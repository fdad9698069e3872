use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] roam_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No entry text provided")]
    EmptyText,
    #[error("No photo chosen; pass --photo PATH or --pick N (see `roam gallery`)")]
    NoPhoto,
    #[error("Gallery photo {pick} is not available ({available} photos sampled)")]
    NoSuchPhoto { pick: usize, available: usize },
    #[error("Camera access is not granted")]
    CameraDenied,
    #[error(
        "Location could not be resolved ({0}). Set a position with `roam config init --latitude .. --longitude ..`, or a fallback label and pass --skip-location"
    )]
    LocationUnresolved(String),
    #[error("Entry index {0} is out of range")]
    InvalidIndex(i64),
    #[error("Refusing to delete without confirmation; pass --yes")]
    ConfirmationRequired,
}
