//! In-memory platform fakes shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::camera::Camera;
use crate::capability::{PermissionProvider, PermissionStatus};
use crate::gallery::{AssetInfo, MediaLibrary, RawAsset};
use crate::location::{Coordinates, Geocoder, Place, PositionProvider};
use crate::models::{Capability, ImageRef};
use crate::notify::{Notification, Notifier};
use crate::storage::{BlobStore, MemoryBlobStore};
use crate::{Error, Result};

/// How the fake platform answers for one capability.
#[derive(Debug, Clone, Copy)]
pub enum FakeAnswer {
    /// Already decided; no prompt is shown.
    Cached(PermissionStatus),
    /// Undetermined until prompted, then answered with the status.
    Prompt(PermissionStatus),
    /// Every call errors.
    Fail,
}

pub struct FakePermissions {
    answers: HashMap<Capability, FakeAnswer>,
    delay: Duration,
    prompted: StdMutex<Vec<Capability>>,
}

impl FakePermissions {
    /// Prompts for every capability and grants it.
    pub fn granting_all() -> Self {
        Self {
            answers: Capability::ALL
                .into_iter()
                .map(|capability| (capability, FakeAnswer::Prompt(PermissionStatus::Granted)))
                .collect(),
            delay: Duration::ZERO,
            prompted: StdMutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, capability: Capability, answer: FakeAnswer) -> Self {
        self.answers.insert(capability, answer);
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Capabilities the user was prompted for, in prompt order.
    pub fn prompted(&self) -> Vec<Capability> {
        self.prompted.lock().unwrap().clone()
    }

    fn answer(&self, capability: Capability) -> FakeAnswer {
        self.answers
            .get(&capability)
            .copied()
            .unwrap_or(FakeAnswer::Cached(PermissionStatus::Denied))
    }
}

#[async_trait]
impl PermissionProvider for FakePermissions {
    async fn status(&self, capability: Capability) -> Result<PermissionStatus> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.answer(capability) {
            FakeAnswer::Cached(status) => Ok(status),
            FakeAnswer::Prompt(_) => Ok(PermissionStatus::Undetermined),
            FakeAnswer::Fail => Err(Error::Platform(format!("{capability} status unavailable"))),
        }
    }

    async fn request(&self, capability: Capability) -> Result<PermissionStatus> {
        self.prompted.lock().unwrap().push(capability);
        match self.answer(capability) {
            FakeAnswer::Cached(status) | FakeAnswer::Prompt(status) => Ok(status),
            FakeAnswer::Fail => Err(Error::Platform(format!("{capability} prompt failed"))),
        }
    }
}

/// Photo library with `photo-0` as the newest asset.
pub struct FakeLibrary {
    ids: Vec<String>,
    without_local: HashSet<String>,
    failing: HashSet<String>,
    list_calls: AtomicUsize,
}

impl FakeLibrary {
    pub fn with_photos(count: usize) -> Self {
        Self {
            ids: (0..count).map(|index| format!("photo-{index}")).collect(),
            without_local: HashSet::new(),
            failing: HashSet::new(),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_local_copy(mut self, id: &str) -> Self {
        self.without_local.insert(id.to_string());
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaLibrary for FakeLibrary {
    async fn recent_photos(&self, offset: usize, count: usize) -> Result<Vec<RawAsset>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .ids
            .iter()
            .skip(offset)
            .take(count)
            .map(|id| RawAsset {
                id: id.clone(),
                uri: format!("content://{id}"),
            })
            .collect())
    }

    async fn asset_info(&self, asset: &RawAsset) -> Result<AssetInfo> {
        if self.failing.contains(&asset.id) {
            return Err(Error::Platform(format!("{} is unavailable", asset.id)));
        }
        let local_uri =
            (!self.without_local.contains(&asset.id)).then(|| format!("/local/{}.jpg", asset.id));
        Ok(AssetInfo { local_uri })
    }
}

pub struct FakePosition {
    coordinates: Option<Coordinates>,
    delay: Duration,
    fixes: AtomicUsize,
}

impl FakePosition {
    pub const fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Some(Coordinates {
                latitude,
                longitude,
            }),
            delay: Duration::ZERO,
            fixes: AtomicUsize::new(0),
        }
    }

    pub const fn failing() -> Self {
        Self {
            coordinates: None,
            delay: Duration::ZERO,
            fixes: AtomicUsize::new(0),
        }
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of position fixes requested so far.
    pub fn fixes(&self) -> usize {
        self.fixes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionProvider for FakePosition {
    async fn current_position(&self) -> Result<Coordinates> {
        self.fixes.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.coordinates
            .ok_or_else(|| Error::Platform("location services unavailable".to_string()))
    }
}

pub struct FakeGeocoder {
    places: Option<Vec<Place>>,
}

impl FakeGeocoder {
    pub const fn returning(places: Vec<Place>) -> Self {
        Self {
            places: Some(places),
        }
    }

    pub const fn failing() -> Self {
        Self { places: None }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn reverse(&self, _coordinates: Coordinates) -> Result<Vec<Place>> {
        self.places
            .clone()
            .ok_or_else(|| Error::Platform("geocoder offline".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::default(),
            fail: true,
        }
    }

    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    /// Wait until `count` notifications arrived or `timeout` passed.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let delivered = self.delivered().await;
            if delivered.len() >= count || tokio::time::Instant::now() >= deadline {
                return delivered;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        if self.fail {
            return Err(Error::Platform("notification service unavailable".to_string()));
        }
        self.delivered.lock().await.push(notification);
        Ok(())
    }
}

/// Memory-backed blob store whose writes can be switched to fail.
pub struct FlakyBlobStore {
    inner: MemoryBlobStore,
    fail_writes: AtomicBool,
    read_delay: Duration,
}

impl FlakyBlobStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBlobStore::new(),
            fail_writes: AtomicBool::new(false),
            read_delay: Duration::ZERO,
        }
    }

    pub const fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, contents: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.inner.write(key, contents).await
    }
}

pub struct FakeCamera {
    image: Option<ImageRef>,
    captures: AtomicUsize,
}

impl FakeCamera {
    pub fn returning(path: &str) -> Self {
        Self {
            image: Some(ImageRef::new(path).unwrap()),
            captures: AtomicUsize::new(0),
        }
    }

    pub const fn cancelled() -> Self {
        Self {
            image: None,
            captures: AtomicUsize::new(0),
        }
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn capture(&self) -> Result<Option<ImageRef>> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(self.image.clone())
    }
}
