//! Persisted, ordered diary entry list.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::BlobStore;
use crate::models::{DiaryEntry, EntryList};
use crate::{Error, Result};

/// Blob key holding the serialized entry list.
pub const ENTRIES_BLOB_KEY: &str = "travel_entries";

/// Single owner of the diary entry list.
///
/// Every mutation reads the whole list and rewrites it. Mutations through
/// one `EntryStore` are serialized; two stores over the same blob are not
/// coordinated and can lose an update.
pub struct EntryStore {
    blobs: Arc<dyn BlobStore>,
    key: String,
    mutation: Mutex<()>,
}

impl EntryStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self::with_key(blobs, ENTRIES_BLOB_KEY)
    }

    pub fn with_key(blobs: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
            mutation: Mutex::new(()),
        }
    }

    /// Read the full entry list; empty when nothing was stored yet.
    ///
    /// A stored blob that does not parse is reported as
    /// [`Error::StorageReadCorrupt`] rather than read as empty.
    pub async fn load(&self) -> Result<EntryList> {
        let Some(raw) = self.blobs.read(&self.key).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str::<EntryList>(&raw).map_err(|error| {
            tracing::error!("Stored diary entries failed to parse: {error}");
            Error::StorageReadCorrupt(error.to_string())
        })
    }

    /// Append an entry to the end of the list and persist it.
    pub async fn append(&self, entry: DiaryEntry) -> Result<EntryList> {
        let _guard = self.mutation.lock().await;

        let mut entries = self.load().await?;
        entries.push(entry);
        self.persist(&entries).await?;

        tracing::info!("Appended diary entry ({} total)", entries.len());
        Ok(entries)
    }

    /// Remove the entry at `index`, keeping the order of the rest.
    ///
    /// An out-of-range index fails with [`Error::OutOfRange`] and leaves the
    /// stored list untouched.
    pub async fn remove_at(&self, index: usize) -> Result<EntryList> {
        let _guard = self.mutation.lock().await;

        let mut entries = self.load().await?;
        if index >= entries.len() {
            tracing::error!(
                "Refusing to remove entry {index}: list has {} entries",
                entries.len()
            );
            return Err(Error::OutOfRange {
                index,
                len: entries.len(),
            });
        }

        entries.remove(index);
        self.persist(&entries).await?;

        tracing::info!("Removed diary entry {index} ({} left)", entries.len());
        Ok(entries)
    }

    async fn persist(&self, entries: &[DiaryEntry]) -> Result<()> {
        let payload = serde_json::to_string_pretty(entries)
            .map_err(|error| Error::StorageWriteFailed(error.to_string()))?;
        self.blobs
            .write(&self.key, &payload)
            .await
            .map_err(|error| {
                tracing::error!("Failed to persist diary entries: {error}");
                Error::StorageWriteFailed(error.to_string())
            })
    }
}
