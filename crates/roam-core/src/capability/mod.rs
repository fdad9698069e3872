//! Device permission acquisition and one-shot grant tracking.
//!
//! [`CapabilityGate`] asks the platform for camera, gallery, location and
//! notification access once per session. Each capability settles exactly once
//! on `Granted` or `Denied`; dependents read the cached state or wait on it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;

use crate::models::{Capability, CapabilitySnapshot, CapabilityState};
use crate::Result;

/// Platform answer to a permission query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

/// Platform permission seam.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Return the answer the platform already holds, without prompting.
    async fn status(&self, capability: Capability) -> Result<PermissionStatus>;

    /// Show the permission prompt and return the user's answer.
    async fn request(&self, capability: Capability) -> Result<PermissionStatus>;
}

/// Requests and caches the grant state of every capability.
pub struct CapabilityGate {
    provider: Arc<dyn PermissionProvider>,
    cells: [watch::Sender<CapabilityState>; 4],
    requested: OnceCell<CapabilitySnapshot>,
}

impl CapabilityGate {
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider,
            cells: std::array::from_fn(|_| watch::channel(CapabilityState::Unknown).0),
            requested: OnceCell::new(),
        }
    }

    /// Acquire all four capabilities concurrently.
    ///
    /// Only the first call talks to the platform; later calls return the
    /// same snapshot. A failing or denied request never affects the others.
    pub async fn request_all(&self) -> CapabilitySnapshot {
        *self
            .requested
            .get_or_init(|| async {
                let (camera, gallery, location, notifications) = tokio::join!(
                    self.acquire(Capability::Camera),
                    self.acquire(Capability::Gallery),
                    self.acquire(Capability::Location),
                    self.acquire(Capability::Notifications),
                );
                CapabilitySnapshot {
                    camera,
                    gallery,
                    location,
                    notifications,
                }
            })
            .await
    }

    /// Cached state of one capability.
    pub fn get(&self, capability: Capability) -> CapabilityState {
        *self.cells[slot(capability)].borrow()
    }

    /// Cached state of every capability.
    pub fn snapshot(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            camera: self.get(Capability::Camera),
            gallery: self.get(Capability::Gallery),
            location: self.get(Capability::Location),
            notifications: self.get(Capability::Notifications),
        }
    }

    /// Receiver that observes the capability's transition out of `Unknown`.
    pub fn subscribe(&self, capability: Capability) -> watch::Receiver<CapabilityState> {
        self.cells[slot(capability)].subscribe()
    }

    /// Wait until the capability has settled and return its final state.
    pub async fn wait_resolved(&self, capability: Capability) -> CapabilityState {
        let mut receiver = self.subscribe(capability);
        let resolved = receiver
            .wait_for(|state| state.is_resolved())
            .await
            .map(|state| *state);
        resolved.unwrap_or(CapabilityState::Denied)
    }

    /// Run `callback` once the capability settles.
    ///
    /// Fires immediately (on the spawned task) when it has already settled.
    pub fn on_change<F>(&self, capability: Capability, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(CapabilityState) + Send + 'static,
    {
        let mut receiver = self.subscribe(capability);
        tokio::spawn(async move {
            let resolved = receiver
                .wait_for(|state| state.is_resolved())
                .await
                .map(|state| *state);
            if let Ok(state) = resolved {
                callback(state);
            }
        })
    }

    async fn acquire(&self, capability: Capability) -> CapabilityState {
        let state = match self.query(capability).await {
            Ok(PermissionStatus::Granted) => CapabilityState::Granted,
            Ok(PermissionStatus::Denied | PermissionStatus::Undetermined) => {
                tracing::info!("Capability {capability} denied");
                CapabilityState::Denied
            }
            Err(error) => {
                tracing::warn!("Permission request for {capability} failed, treating as denied: {error}");
                CapabilityState::Denied
            }
        };
        self.settle(capability, state)
    }

    async fn query(&self, capability: Capability) -> Result<PermissionStatus> {
        match self.provider.status(capability).await? {
            PermissionStatus::Undetermined => {
                tracing::debug!("Prompting for {capability} permission");
                self.provider.request(capability).await
            }
            cached => Ok(cached),
        }
    }

    /// Set the state unless it has already settled; returns the final state.
    fn settle(&self, capability: Capability, state: CapabilityState) -> CapabilityState {
        let cell = &self.cells[slot(capability)];
        cell.send_if_modified(|current| {
            if current.is_resolved() {
                false
            } else {
                *current = state;
                true
            }
        });
        let settled = *cell.borrow();
        tracing::debug!("Capability {capability} resolved as {settled}");
        settled
    }
}

const fn slot(capability: Capability) -> usize {
    match capability {
        Capability::Camera => 0,
        Capability::Gallery => 1,
        Capability::Location => 2,
        Capability::Notifications => 3,
    }
}
