//! Capture pipeline: composes a draft and commits it as a diary entry.
//!
//! The pipeline state is level-triggered on the three readiness fields
//! (image, location, non-blank text):
//!
//! ```text
//! Empty -> HasImage -> Ready -> Saving -> Empty
//! ```
//!
//! A failed save returns to `Ready` with the draft untouched.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::camera::Camera;
use crate::capability::CapabilityGate;
use crate::location::LocationOutcome;
use crate::models::{Capability, DiaryEntry, Draft, ImageRef};
use crate::notify::NotificationDispatcher;
use crate::storage::EntryStore;
use crate::{Error, Result};

/// Where the capture screen stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No image chosen yet.
    Empty,
    /// Image chosen; location or text still missing.
    HasImage,
    /// Commit is enabled.
    Ready,
    /// A commit is in flight.
    Saving,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Empty => "empty",
            Self::HasImage => "has-image",
            Self::Ready => "ready",
            Self::Saving => "saving",
        };
        f.write_str(text)
    }
}

/// What to do when no location label could be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LocationPolicy {
    /// Commit stays disabled until a location resolves.
    #[default]
    Required,
    /// The user may explicitly accept a placeholder label instead.
    Fallback { label: String },
}

/// Orchestrates draft composition and commit for one capture screen.
pub struct CapturePipeline {
    gate: Arc<CapabilityGate>,
    store: Arc<EntryStore>,
    notifications: NotificationDispatcher,
    policy: LocationPolicy,
    draft: Draft,
    state: watch::Sender<PipelineState>,
    pending_notification: Option<JoinHandle<()>>,
}

impl CapturePipeline {
    pub fn new(
        gate: Arc<CapabilityGate>,
        store: Arc<EntryStore>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            gate,
            store,
            notifications,
            policy: LocationPolicy::default(),
            draft: Draft::default(),
            state: watch::channel(PipelineState::Empty).0,
            pending_notification: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: LocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Receiver for state changes, for rendering layers.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_committable(&self) -> bool {
        self.state() == PipelineState::Ready
    }

    /// Use an image picked from the gallery.
    pub fn set_image(&mut self, image_ref: ImageRef) {
        self.draft.image_ref = Some(image_ref);
        self.publish();
    }

    /// Take a photo with the camera and use it as the draft image.
    ///
    /// Returns `false` when camera access is not granted or the capture was
    /// cancelled; the draft is left as it was in both cases.
    pub async fn capture_photo(&mut self, camera: &dyn Camera) -> Result<bool> {
        if !self.gate.get(Capability::Camera).is_granted() {
            tracing::debug!("Camera access not granted, ignoring capture");
            return Ok(false);
        }

        match camera.capture().await? {
            Some(image_ref) => {
                self.set_image(image_ref);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
        self.publish();
    }

    /// Feed a location resolution into the draft.
    ///
    /// An unresolved outcome leaves the current label (if any) in place.
    pub fn apply_location(&mut self, outcome: &LocationOutcome) {
        if let Some(label) = outcome.label() {
            self.draft.location_label = Some(label.to_string());
            self.publish();
        }
    }

    /// Explicitly accept the policy's placeholder when no location resolved.
    ///
    /// Returns whether the draft now has a location. Always `false` under
    /// [`LocationPolicy::Required`] with no resolved label.
    pub fn accept_missing_location(&mut self) -> bool {
        if self.draft.has_location() {
            return true;
        }
        match &self.policy {
            LocationPolicy::Required => false,
            LocationPolicy::Fallback { label } => {
                tracing::info!("Using placeholder location '{label}'");
                self.draft.location_label = Some(label.clone());
                self.publish();
                true
            }
        }
    }

    /// Persist the draft as a new entry.
    ///
    /// Fails with [`Error::NotReady`] unless the pipeline is `Ready`. On a
    /// storage failure the draft is kept and the pipeline returns to
    /// `Ready`. On success the image and text are cleared; the resolved
    /// location is kept for the next entry.
    pub async fn commit(&mut self) -> Result<DiaryEntry> {
        match self.state() {
            PipelineState::Ready => {}
            PipelineState::Saving => {
                return Err(Error::NotReady("a save is already in progress".to_string()));
            }
            PipelineState::Empty | PipelineState::HasImage => {
                return Err(Error::NotReady(self.draft.missing_fields().join(", ")));
            }
        }

        self.state.send_replace(PipelineState::Saving);
        let saved = self.save().await;

        match saved {
            Ok(entry) => {
                self.pending_notification = self.notifications.notify_saved(entry.location_label());
                self.draft.image_ref = None;
                self.draft.text.clear();
                self.publish();
                Ok(entry)
            }
            Err(error) => {
                tracing::warn!("Saving diary entry failed, keeping draft: {error}");
                self.publish();
                Err(error)
            }
        }
    }

    /// Handle of the saved notification spawned by the last successful
    /// commit, if one was sent.
    ///
    /// Awaiting it is optional; the commit already succeeded.
    pub fn take_pending_notification(&mut self) -> Option<JoinHandle<()>> {
        self.pending_notification.take()
    }

    async fn save(&self) -> Result<DiaryEntry> {
        let image_ref = self
            .draft
            .image_ref
            .clone()
            .ok_or_else(|| Error::NotReady("image".to_string()))?;
        let location_label = self
            .draft
            .location_label
            .as_deref()
            .ok_or_else(|| Error::NotReady("location".to_string()))?;

        let entry = DiaryEntry::new(image_ref, location_label, &self.draft.text, Utc::now())?;
        self.store.append(entry.clone()).await?;
        Ok(entry)
    }

    fn publish(&self) {
        let next = if !self.draft.has_image() {
            PipelineState::Empty
        } else if self.draft.has_location() && self.draft.has_text() {
            PipelineState::Ready
        } else {
            PipelineState::HasImage
        };
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                tracing::debug!("Capture pipeline {current} -> {next}");
                *current = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::SubsecRound;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::capability::PermissionStatus;
    use crate::location::UnresolvedReason;
    use crate::testing::{FakeAnswer, FakeCamera, FakePermissions, FlakyBlobStore, RecordingNotifier};

    struct Harness {
        pipeline: CapturePipeline,
        store: Arc<EntryStore>,
        blobs: Arc<FlakyBlobStore>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn harness(permissions: FakePermissions) -> Harness {
        let gate = Arc::new(CapabilityGate::new(Arc::new(permissions)));
        gate.request_all().await;
        let blobs = Arc::new(FlakyBlobStore::new());
        let store = Arc::new(EntryStore::new(blobs.clone()));
        let notifier = Arc::new(RecordingNotifier::default());
        let notifications = NotificationDispatcher::new(gate.clone(), notifier.clone());
        Harness {
            pipeline: CapturePipeline::new(gate, store.clone(), notifications),
            store,
            blobs,
            notifier,
        }
    }

    fn resolved(label: &str) -> LocationOutcome {
        LocationOutcome::Resolved {
            label: label.to_string(),
        }
    }

    fn image(path: &str) -> ImageRef {
        ImageRef::new(path).unwrap()
    }

    #[tokio::test]
    async fn state_follows_readiness_fields() {
        let mut h = harness(FakePermissions::granting_all()).await;
        assert_eq!(h.pipeline.state(), PipelineState::Empty);

        h.pipeline.set_text("Sunset on the pier");
        assert_eq!(h.pipeline.state(), PipelineState::Empty);

        h.pipeline.set_image(image("/photos/pier.jpg"));
        assert_eq!(h.pipeline.state(), PipelineState::HasImage);

        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));
        assert_eq!(h.pipeline.state(), PipelineState::Ready);

        h.pipeline.set_text("   ");
        assert_eq!(h.pipeline.state(), PipelineState::HasImage);
        assert!(!h.pipeline.is_committable());

        h.pipeline.set_text("Sunset again");
        assert!(h.pipeline.is_committable());
    }

    #[tokio::test]
    async fn commit_rejects_incomplete_draft() {
        let mut h = harness(FakePermissions::granting_all()).await;
        h.pipeline.set_image(image("/photos/pier.jpg"));
        h.pipeline.set_text("hello");

        let error = h.pipeline.commit().await.unwrap_err();
        assert!(matches!(error, Error::NotReady(ref missing) if missing == "location"));
        assert!(h.store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn camera_capture_with_denied_gallery() {
        let mut h = harness(
            FakePermissions::granting_all()
                .with(Capability::Gallery, FakeAnswer::Prompt(PermissionStatus::Denied)),
        )
        .await;
        let camera = FakeCamera::returning("/media/abc.jpg");

        assert!(h.pipeline.capture_photo(&camera).await.unwrap());
        h.pipeline.set_text("Sunset on the pier");
        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));

        let before = Utc::now().trunc_subsecs(3);
        let entry = h.pipeline.commit().await.unwrap();
        let after = Utc::now();

        assert_eq!(entry.image_ref().as_str(), "/media/abc.jpg");
        assert_eq!(entry.location_label(), "Lisbon, Portugal");
        assert_eq!(entry.text(), "Sunset on the pier");
        assert!(entry.created_at() >= before && entry.created_at() <= after);
        assert_eq!(h.store.load().await.unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn capture_ignored_without_camera_access() {
        let mut h = harness(
            FakePermissions::granting_all()
                .with(Capability::Camera, FakeAnswer::Prompt(PermissionStatus::Denied)),
        )
        .await;
        let camera = FakeCamera::returning("/media/abc.jpg");

        assert!(!h.pipeline.capture_photo(&camera).await.unwrap());
        assert_eq!(camera.captures(), 0);
        assert_eq!(h.pipeline.state(), PipelineState::Empty);
    }

    #[tokio::test]
    async fn cancelled_capture_keeps_previous_image() {
        let mut h = harness(FakePermissions::granting_all()).await;
        h.pipeline.set_image(image("/photos/first.jpg"));

        assert!(!h.pipeline.capture_photo(&FakeCamera::cancelled()).await.unwrap());
        assert_eq!(
            h.pipeline.draft().image_ref,
            Some(image("/photos/first.jpg"))
        );
    }

    #[tokio::test]
    async fn successive_commits_keep_order_and_reset_draft() {
        let mut h = harness(FakePermissions::granting_all()).await;
        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));

        h.pipeline.set_image(image("/photos/1.jpg"));
        h.pipeline.set_text("entry one");
        let first = h.pipeline.commit().await.unwrap();
        assert_eq!(h.pipeline.state(), PipelineState::Empty);
        assert_eq!(h.pipeline.draft().text, "");
        assert_eq!(
            h.pipeline.draft().location_label.as_deref(),
            Some("Lisbon, Portugal")
        );

        h.pipeline.set_image(image("/photos/2.jpg"));
        h.pipeline.set_text("entry two");
        let second = h.pipeline.commit().await.unwrap();

        assert!(first.created_at() <= second.created_at());
        assert_eq!(
            h.store.load().await.unwrap(),
            vec![first, second.clone()]
        );
        assert_eq!(h.store.remove_at(0).await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn unresolved_location_keeps_commit_disabled() {
        let mut h = harness(FakePermissions::granting_all()).await;
        h.pipeline.set_image(image("/photos/pier.jpg"));
        h.pipeline.set_text("Sunset on the pier");
        h.pipeline
            .apply_location(&LocationOutcome::Unresolved(UnresolvedReason::NoCandidates));

        assert_eq!(h.pipeline.draft().location_label, None);
        assert_eq!(h.pipeline.state(), PipelineState::HasImage);
        assert!(!h.pipeline.accept_missing_location());
        assert!(h.pipeline.commit().await.is_err());
    }

    #[tokio::test]
    async fn fallback_policy_allows_explicit_skip() {
        let Harness {
            pipeline, store, ..
        } = harness(FakePermissions::granting_all()).await;
        let mut pipeline = pipeline.with_policy(LocationPolicy::Fallback {
            label: "Somewhere".to_string(),
        });
        pipeline.set_image(image("/photos/pier.jpg"));
        pipeline.set_text("Sunset on the pier");
        assert_eq!(pipeline.state(), PipelineState::HasImage);

        assert!(pipeline.accept_missing_location());
        let entry = pipeline.commit().await.unwrap();

        assert_eq!(entry.location_label(), "Somewhere");
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_returns_to_ready_with_draft_intact() {
        let mut h = harness(FakePermissions::granting_all()).await;
        h.pipeline.set_image(image("/photos/pier.jpg"));
        h.pipeline.set_text("Sunset on the pier");
        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));
        let draft = h.pipeline.draft().clone();

        h.blobs.fail_writes(true);
        let error = h.pipeline.commit().await.unwrap_err();

        assert!(matches!(error, Error::StorageWriteFailed(_)));
        assert_eq!(h.pipeline.state(), PipelineState::Ready);
        assert_eq!(h.pipeline.draft(), &draft);
        assert!(h.notifier.delivered().await.is_empty());

        h.blobs.fail_writes(false);
        assert!(h.pipeline.commit().await.is_ok());
    }

    #[tokio::test]
    async fn commit_notifies_when_granted() {
        let mut h = harness(FakePermissions::granting_all()).await;
        h.pipeline.set_image(image("/photos/pier.jpg"));
        h.pipeline.set_text("Sunset on the pier");
        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));

        h.pipeline.commit().await.unwrap();

        let delivered = h.notifier.wait_for(1, Duration::from_secs(1)).await;
        assert_eq!(delivered[0].body, "Your memory from Lisbon, Portugal was added.");
    }

    #[tokio::test]
    async fn pending_notification_can_be_awaited_after_commit() {
        let mut h = harness(FakePermissions::granting_all()).await;
        assert!(h.pipeline.take_pending_notification().is_none());
        h.pipeline.set_image(image("/photos/pier.jpg"));
        h.pipeline.set_text("Sunset on the pier");
        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));

        h.pipeline.commit().await.unwrap();
        let handle = h.pipeline.take_pending_notification().unwrap();
        handle.await.unwrap();

        assert_eq!(h.notifier.delivered().await.len(), 1);
        assert!(h.pipeline.take_pending_notification().is_none());
    }

    #[tokio::test]
    async fn no_pending_notification_without_grant() {
        let mut h = harness(
            FakePermissions::granting_all()
                .with(Capability::Notifications, FakeAnswer::Cached(PermissionStatus::Denied)),
        )
        .await;
        h.pipeline.set_image(image("/photos/pier.jpg"));
        h.pipeline.set_text("Sunset on the pier");
        h.pipeline.apply_location(&resolved("Lisbon, Portugal"));

        h.pipeline.commit().await.unwrap();

        assert!(h.pipeline.take_pending_notification().is_none());
    }

    #[tokio::test]
    async fn failing_notifier_does_not_fail_commit() {
        let gate = Arc::new(CapabilityGate::new(Arc::new(FakePermissions::granting_all())));
        gate.request_all().await;
        let store = Arc::new(EntryStore::new(Arc::new(FlakyBlobStore::new())));
        let notifications =
            NotificationDispatcher::new(gate.clone(), Arc::new(RecordingNotifier::failing()));
        let mut pipeline = CapturePipeline::new(gate, store.clone(), notifications);
        pipeline.set_image(image("/photos/pier.jpg"));
        pipeline.set_text("Sunset on the pier");
        pipeline.apply_location(&resolved("Lisbon, Portugal"));

        assert!(pipeline.commit().await.is_ok());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn every_committed_entry_is_complete() {
        let mut h = harness(FakePermissions::granting_all()).await;
        let texts = ["  padded  ", "", "\n", "ok", "multi\nline"];

        for (index, text) in texts.iter().enumerate() {
            if index % 2 == 0 {
                h.pipeline.apply_location(&resolved("Lisbon, Portugal"));
            }
            h.pipeline.set_image(image(&format!("/photos/{index}.jpg")));
            h.pipeline.set_text(*text);
            let _ = h.pipeline.commit().await;
        }

        let entries = h.store.load().await.unwrap();
        assert_eq!(entries.len(), 3);
        for entry in entries {
            assert!(!entry.image_ref().as_str().is_empty());
            assert!(!entry.location_label().trim().is_empty());
            assert!(!entry.text().trim().is_empty());
        }
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let mut h = harness(FakePermissions::granting_all()).await;
        let mut receiver = h.pipeline.subscribe();

        h.pipeline.set_image(image("/photos/pier.jpg"));
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), PipelineState::HasImage);

        h.pipeline.set_image(image("/photos/other.jpg"));
        assert!(!receiver.has_changed().unwrap());
    }
}
