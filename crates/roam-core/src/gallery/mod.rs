//! Recent-photo sampling from the device gallery.

mod directory;

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;

use crate::capability::CapabilityGate;
use crate::models::{Capability, ImageRef};
use crate::util::normalize_text_option;
use crate::Result;

pub use directory::DirectoryMediaLibrary;

/// Number of sampled photos the capture screen shows inline.
pub const PREVIEW_COUNT: usize = 4;

/// A gallery asset as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    pub id: String,
    /// Transient URI, valid while the listing is alive.
    pub uri: String,
}

/// Extra asset details resolved on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetInfo {
    /// Locally cached copy, durable beyond the picker session.
    pub local_uri: Option<String>,
}

/// Platform photo library seam.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// List up to `count` photos starting at `offset`, newest first.
    async fn recent_photos(&self, offset: usize, count: usize) -> Result<Vec<RawAsset>>;

    /// Resolve details for one listed asset.
    async fn asset_info(&self, asset: &RawAsset) -> Result<AssetInfo>;
}

/// Snapshot of recent gallery photos, newest first.
///
/// The sample does not track later library changes; take a new sample to
/// refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GallerySample {
    refs: Vec<ImageRef>,
}

impl GallerySample {
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ImageRef> {
        self.refs.get(index)
    }

    /// The leading photos shown inline on the capture screen.
    #[must_use]
    pub fn preview(&self) -> &[ImageRef] {
        &self.refs[..self.refs.len().min(PREVIEW_COUNT)]
    }
}

impl IntoIterator for GallerySample {
    type Item = ImageRef;
    type IntoIter = std::vec::IntoIter<ImageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.into_iter()
    }
}

/// Samples recent photos once gallery access is granted.
pub struct GallerySampler {
    gate: Arc<CapabilityGate>,
    library: Arc<dyn MediaLibrary>,
}

impl GallerySampler {
    pub fn new(gate: Arc<CapabilityGate>, library: Arc<dyn MediaLibrary>) -> Self {
        Self { gate, library }
    }

    /// Collect up to `limit` durable photo references, newest first.
    ///
    /// Returns an empty sample when gallery access is not granted. Assets
    /// that fail to resolve are skipped and replaced by older ones.
    pub async fn sample(&self, limit: NonZeroUsize) -> GallerySample {
        if !self.gate.get(Capability::Gallery).is_granted() {
            tracing::debug!("Gallery access not granted, skipping sample");
            return GallerySample::default();
        }

        let limit = limit.get();
        let mut refs = Vec::with_capacity(limit);
        let mut offset = 0;

        while refs.len() < limit {
            let wanted = limit - refs.len();
            let page = match self.library.recent_photos(offset, wanted).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!("Failed to list gallery photos at offset {offset}: {error}");
                    break;
                }
            };
            if page.is_empty() {
                break;
            }
            let exhausted = page.len() < wanted;
            offset += page.len();

            for asset in &page {
                if let Some(image_ref) = self.resolve(asset).await {
                    refs.push(image_ref);
                }
            }

            if exhausted {
                break;
            }
        }

        tracing::debug!("Sampled {} gallery photos", refs.len());
        GallerySample { refs }
    }

    async fn resolve(&self, asset: &RawAsset) -> Option<ImageRef> {
        let info = match self.library.asset_info(asset).await {
            Ok(info) => info,
            Err(error) => {
                tracing::warn!("Skipping gallery asset {}: {error}", asset.id);
                return None;
            }
        };

        let uri = normalize_text_option(info.local_uri).unwrap_or_else(|| asset.uri.clone());
        match ImageRef::new(uri) {
            Ok(image_ref) => Some(image_ref),
            Err(error) => {
                tracing::warn!("Skipping gallery asset {}: {error}", asset.id);
                None
            }
        }
    }
}
