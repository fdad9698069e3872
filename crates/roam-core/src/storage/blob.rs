//! Key/value blob storage: whole values read and written at once.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::{Error, Result};

/// Storage of named text blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob; `None` when it was never written.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a blob's whole contents.
    async fn write(&self, key: &str, contents: &str) -> Result<()>;
}

/// One JSON file per blob under a root directory.
///
/// Writes go to a temp file that is renamed over the target, so a reader
/// sees either the old or the new contents.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path backing a blob key.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).await?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await?;
        tracing::debug!("Wrote blob {key} ({} bytes)", contents.len());
        Ok(())
    }
}

/// In-memory blob store (primarily for tests and previews).
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, contents: &str) -> Result<()> {
        self.blobs
            .lock()
            .await
            .insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid blob key '{key}'")))
    }
}
