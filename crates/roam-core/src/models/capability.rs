//! Device capability model

use std::fmt;

use serde::{Deserialize, Serialize};

/// A device-gated permission the capture flow depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Camera,
    Gallery,
    Location,
    Notifications,
}

impl Capability {
    /// Every capability, in request order.
    pub const ALL: [Self; 4] = [
        Self::Camera,
        Self::Gallery,
        Self::Location,
        Self::Notifications,
    ];

    /// Stable string id used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Gallery => "gallery",
            Self::Location => "location",
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant state of a single capability within one session.
///
/// Starts as `Unknown` and settles exactly once on `Granted` or `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl CapabilityState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for CapabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of all four capability states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub camera: CapabilityState,
    pub gallery: CapabilityState,
    pub location: CapabilityState,
    pub notifications: CapabilityState,
}

impl CapabilitySnapshot {
    #[must_use]
    pub const fn get(&self, capability: Capability) -> CapabilityState {
        match capability {
            Capability::Camera => self.camera,
            Capability::Gallery => self.gallery,
            Capability::Location => self.location,
            Capability::Notifications => self.notifications,
        }
    }

    /// True once every capability has left `Unknown`.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        Capability::ALL
            .iter()
            .all(|capability| self.get(*capability).is_resolved())
    }
}
