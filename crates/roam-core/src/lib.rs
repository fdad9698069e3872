//! roam-core - Core library for roam
//!
//! This crate contains the travel diary models, capability gating, the
//! capture pipeline and entry persistence used by the roam interfaces.

pub mod camera;
pub mod capability;
pub mod config;
pub mod error;
pub mod export;
pub mod gallery;
pub mod location;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
mod util;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::{Capability, CapabilityState, DiaryEntry, Draft, EntryList, ImageRef};
pub use pipeline::{CapturePipeline, LocationPolicy, PipelineState};
pub use services::{DiaryServices, MountedCapture, Platform};
