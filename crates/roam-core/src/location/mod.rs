//! One-shot location resolution: position fix plus reverse geocoding.

mod nominatim;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::capability::CapabilityGate;
use crate::models::Capability;
use crate::util::normalize_text_option;
use crate::{Error, Result};

pub use nominatim::{parse_reverse_response, NominatimGeocoder};

/// Default bound on waiting for a position fix.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(15);

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinates = Self {
            latitude,
            longitude,
        };
        coordinates.validate()?;
        Ok(coordinates)
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude {} is outside -90..=90",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude {} is outside -180..=180",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// One reverse-geocoding candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Platform position seam.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Acquire a single position fix.
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Reverse geocoding seam.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate places for a coordinate, best match first.
    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<Place>>;
}

/// Position source that always reports the same configured spot.
#[derive(Debug, Clone, Default)]
pub struct FixedPosition {
    coordinates: Option<Coordinates>,
}

impl FixedPosition {
    #[must_use]
    pub const fn new(coordinates: Option<Coordinates>) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl PositionProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        self.coordinates
            .ok_or_else(|| Error::Platform("no position source configured".to_string()))
    }
}

/// Why a location label could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Location access is not granted (or not decided yet).
    NotGranted,
    /// The position fix failed.
    PositionUnavailable,
    /// The position fix did not arrive in time.
    TimedOut,
    /// The geocoder call failed.
    GeocodeFailed,
    /// The geocoder returned no usable place.
    NoCandidates,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotGranted => "location access not granted",
            Self::PositionUnavailable => "position unavailable",
            Self::TimedOut => "position fix timed out",
            Self::GeocodeFailed => "reverse geocoding failed",
            Self::NoCandidates => "no place found for position",
        };
        f.write_str(text)
    }
}

/// Result of a location resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationOutcome {
    Resolved { label: String },
    Unresolved(UnresolvedReason),
}

impl LocationOutcome {
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Resolved { label } => Some(label),
            Self::Unresolved(_) => None,
        }
    }
}

/// Format a place as `"{city}, {country}"`.
///
/// Falls back to whichever half is present; `None` when both are missing.
#[must_use]
pub fn format_place_label(place: &Place) -> Option<String> {
    let city = normalize_text_option(place.city.clone());
    let country = normalize_text_option(place.country.clone());
    match (city, country) {
        (Some(city), Some(country)) => Some(format!("{city}, {country}")),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

/// Resolves the device location to a human-readable label, once per session.
pub struct LocationResolver {
    gate: Arc<CapabilityGate>,
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn Geocoder>,
    fix_timeout: Duration,
    outcome: OnceCell<LocationOutcome>,
}

impl LocationResolver {
    pub fn new(
        gate: Arc<CapabilityGate>,
        position: Arc<dyn PositionProvider>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            gate,
            position,
            geocoder,
            fix_timeout: DEFAULT_FIX_TIMEOUT,
            outcome: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn with_fix_timeout(mut self, fix_timeout: Duration) -> Self {
        self.fix_timeout = fix_timeout;
        self
    }

    /// Resolve the current location label.
    ///
    /// Returns `NotGranted` without touching the platform unless location
    /// access is granted. Once a granted resolution has run, later calls
    /// return its outcome instead of taking a new fix.
    pub async fn resolve(&self) -> LocationOutcome {
        if !self.gate.get(Capability::Location).is_granted() {
            return LocationOutcome::Unresolved(UnresolvedReason::NotGranted);
        }

        self.outcome
            .get_or_init(|| self.resolve_once())
            .await
            .clone()
    }

    async fn resolve_once(&self) -> LocationOutcome {
        let coordinates =
            match tokio::time::timeout(self.fix_timeout, self.position.current_position()).await {
                Ok(Ok(coordinates)) => coordinates,
                Ok(Err(error)) => {
                    tracing::warn!("Position fix failed: {error}");
                    return LocationOutcome::Unresolved(UnresolvedReason::PositionUnavailable);
                }
                Err(_) => {
                    tracing::warn!(
                        "Position fix timed out after {}s",
                        self.fix_timeout.as_secs_f32()
                    );
                    return LocationOutcome::Unresolved(UnresolvedReason::TimedOut);
                }
            };

        let places = match self.geocoder.reverse(coordinates).await {
            Ok(places) => places,
            Err(error) => {
                tracing::warn!("Reverse geocoding failed: {error}");
                return LocationOutcome::Unresolved(UnresolvedReason::GeocodeFailed);
            }
        };

        match places.first().and_then(format_place_label) {
            Some(label) => {
                tracing::info!("Resolved location: {label}");
                LocationOutcome::Resolved { label }
            }
            None => {
                tracing::info!("Reverse geocoding returned no usable place");
                LocationOutcome::Unresolved(UnresolvedReason::NoCandidates)
            }
        }
    }
}
