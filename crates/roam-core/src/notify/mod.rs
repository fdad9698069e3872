//! Best-effort local notifications.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::capability::CapabilityGate;
use crate::models::Capability;
use crate::Result;

/// A local notification to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    /// Notification shown after an entry is saved.
    #[must_use]
    pub fn entry_saved(location_label: &str) -> Self {
        Self {
            title: "New Travel Entry Saved!".to_string(),
            body: format!("Your memory from {location_label} was added."),
        }
    }
}

/// Platform notification seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        tracing::info!("{}: {}", notification.title, notification.body);
        Ok(())
    }
}

/// Sends the "entry saved" notification without holding up the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    gate: Arc<CapabilityGate>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(gate: Arc<CapabilityGate>, notifier: Arc<dyn Notifier>) -> Self {
        Self { gate, notifier }
    }

    /// Fire the saved notification on a detached task.
    ///
    /// Does nothing unless notifications are granted. Delivery failures are
    /// logged and dropped. The handle is only useful to callers that want to
    /// observe delivery; dropping it does not cancel the task.
    pub fn notify_saved(&self, location_label: &str) -> Option<JoinHandle<()>> {
        if !self.gate.get(Capability::Notifications).is_granted() {
            tracing::debug!("Notifications not granted, skipping saved notification");
            return None;
        }

        let notifier = Arc::clone(&self.notifier);
        let notification = Notification::entry_saved(location_label);
        Some(tokio::spawn(async move {
            if let Err(error) = notifier.notify(notification).await {
                tracing::warn!("Failed to deliver saved notification: {error}");
            }
        }))
    }
}
