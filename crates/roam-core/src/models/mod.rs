//! Data models for roam

mod capability;
mod draft;
mod entry;

pub use capability::{Capability, CapabilitySnapshot, CapabilityState};
pub use draft::Draft;
pub use entry::{DiaryEntry, EntryList, ImageRef};
