//! Photo capture and durable media storage.
//!
//! Captured photos are copied into the app's media directory under their
//! SHA-256 hash, so the reference outlives the capture session.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::models::ImageRef;
use crate::{Error, Result};

/// Platform camera seam.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Take a photo and return a durable reference; `None` when cancelled.
    async fn capture(&self) -> Result<Option<ImageRef>>;
}

/// Camera stand-in that "captures" an existing image file.
///
/// The file is copied into `media_dir`; no source means the capture was
/// cancelled.
#[derive(Debug, Clone)]
pub struct ImportCamera {
    media_dir: PathBuf,
    source: Option<PathBuf>,
}

impl ImportCamera {
    pub fn new(media_dir: impl Into<PathBuf>, source: Option<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            source,
        }
    }
}

#[async_trait]
impl Camera for ImportCamera {
    async fn capture(&self) -> Result<Option<ImageRef>> {
        let Some(source) = &self.source else {
            tracing::debug!("Capture cancelled");
            return Ok(None);
        };

        let bytes = fs::read(source).await.map_err(|error| {
            Error::Platform(format!("cannot read photo {}: {error}", source.display()))
        })?;
        let extension = source
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("jpg");
        let stored = store_photo(&self.media_dir, &bytes, extension).await?;
        ImageRef::new(stored.display().to_string()).map(Some)
    }
}

/// Write photo bytes under their content hash; returns the stored path.
///
/// Storing the same bytes twice yields the same path.
pub async fn store_photo(media_dir: &Path, bytes: &[u8], extension: &str) -> Result<PathBuf> {
    let hash = format!("{:x}", Sha256::digest(bytes));
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    let path = media_dir.join(format!("{hash}.{extension}"));

    if fs::try_exists(&path).await? {
        tracing::debug!("Photo already stored: {}", path.display());
        return Ok(path);
    }

    fs::create_dir_all(media_dir).await?;
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(&temp_path, &path).await?;

    tracing::debug!("Stored photo {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
