//! Wiring of the capture components over a set of platform seams.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::capability::{CapabilityGate, PermissionProvider};
use crate::config::DiaryConfig;
use crate::gallery::{GallerySample, GallerySampler, MediaLibrary};
use crate::location::{Geocoder, LocationOutcome, LocationResolver, PositionProvider};
use crate::models::{Capability, CapabilitySnapshot};
use crate::notify::{NotificationDispatcher, Notifier};
use crate::pipeline::{CapturePipeline, LocationPolicy};
use crate::storage::{BlobStore, EntryStore};

/// Platform implementations the diary runs on.
pub struct Platform {
    pub permissions: Arc<dyn PermissionProvider>,
    pub library: Arc<dyn MediaLibrary>,
    pub position: Arc<dyn PositionProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub notifier: Arc<dyn Notifier>,
    pub blobs: Arc<dyn BlobStore>,
}

/// What the capture screen knows once it has mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedCapture {
    pub capabilities: CapabilitySnapshot,
    pub gallery: GallerySample,
    pub location: LocationOutcome,
}

/// Session-scoped capture services sharing one capability gate and store.
pub struct DiaryServices {
    gate: Arc<CapabilityGate>,
    sampler: GallerySampler,
    resolver: LocationResolver,
    store: Arc<EntryStore>,
    notifications: NotificationDispatcher,
    policy: LocationPolicy,
    sample_limit: NonZeroUsize,
}

impl DiaryServices {
    pub fn new(platform: Platform, config: &DiaryConfig) -> Self {
        let gate = Arc::new(CapabilityGate::new(platform.permissions));
        Self {
            sampler: GallerySampler::new(gate.clone(), platform.library),
            resolver: LocationResolver::new(gate.clone(), platform.position, platform.geocoder)
                .with_fix_timeout(config.location_timeout()),
            store: Arc::new(EntryStore::new(platform.blobs)),
            notifications: NotificationDispatcher::new(gate.clone(), platform.notifier),
            policy: config.location_policy.clone(),
            sample_limit: config.sample_limit(),
            gate,
        }
    }

    pub const fn gate(&self) -> &Arc<CapabilityGate> {
        &self.gate
    }

    pub const fn store(&self) -> &Arc<EntryStore> {
        &self.store
    }

    pub const fn sampler(&self) -> &GallerySampler {
        &self.sampler
    }

    pub const fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Request capabilities, then sample the gallery and resolve the
    /// location as soon as their grants settle.
    pub async fn mount(&self) -> MountedCapture {
        let (capabilities, gallery, location) = tokio::join!(
            self.gate.request_all(),
            async {
                self.gate.wait_resolved(Capability::Gallery).await;
                self.sampler.sample(self.sample_limit).await
            },
            async {
                self.gate.wait_resolved(Capability::Location).await;
                self.resolver.resolve().await
            },
        );

        tracing::debug!(
            "Capture mounted: {} gallery photos, location {:?}",
            gallery.len(),
            location
        );
        MountedCapture {
            capabilities,
            gallery,
            location,
        }
    }

    /// Mount and hand back a pipeline seeded with the resolved location.
    pub async fn open_capture(&self) -> (CapturePipeline, MountedCapture) {
        let mounted = self.mount().await;
        let mut pipeline = self.pipeline();
        pipeline.apply_location(&mounted.location);
        (pipeline, mounted)
    }

    /// A fresh pipeline over the shared store.
    pub fn pipeline(&self) -> CapturePipeline {
        CapturePipeline::new(
            self.gate.clone(),
            self.store.clone(),
            self.notifications.clone(),
        )
        .with_policy(self.policy.clone())
    }
}
