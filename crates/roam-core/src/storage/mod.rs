//! Named blob persistence and the diary entry store built on it.

mod blob;
mod entry_store;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use entry_store::{EntryStore, ENTRIES_BLOB_KEY};
