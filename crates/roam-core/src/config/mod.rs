//! Diary runtime configuration.
//!
//! Stored as `roam-config.json` in the data directory. Missing or broken
//! files fall back to defaults so the diary stays usable.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capability::{PermissionProvider, PermissionStatus};
use crate::location::{Coordinates, DEFAULT_FIX_TIMEOUT};
use crate::models::Capability;
use crate::pipeline::LocationPolicy;
use crate::util::is_http_url;
use crate::{Error, Result};

/// File name of the config inside the data directory.
pub const CONFIG_FILE: &str = "roam-config.json";

pub const DEFAULT_SAMPLE_LIMIT: usize = 10;
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Preset answer for one capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAnswer {
    Granted,
    Denied,
    /// Ask the user when the capability is first needed.
    #[default]
    Prompt,
}

impl PermissionAnswer {
    #[must_use]
    pub const fn status(self) -> PermissionStatus {
        match self {
            Self::Granted => PermissionStatus::Granted,
            Self::Denied => PermissionStatus::Denied,
            Self::Prompt => PermissionStatus::Undetermined,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionAnswers {
    pub camera: PermissionAnswer,
    pub gallery: PermissionAnswer,
    pub location: PermissionAnswer,
    pub notifications: PermissionAnswer,
}

impl PermissionAnswers {
    #[must_use]
    pub const fn granting_all() -> Self {
        Self {
            camera: PermissionAnswer::Granted,
            gallery: PermissionAnswer::Granted,
            location: PermissionAnswer::Granted,
            notifications: PermissionAnswer::Granted,
        }
    }

    #[must_use]
    pub const fn get(&self, capability: Capability) -> PermissionAnswer {
        match capability {
            Capability::Camera => self.camera,
            Capability::Gallery => self.gallery,
            Capability::Location => self.location,
            Capability::Notifications => self.notifications,
        }
    }

    pub fn set(&mut self, capability: Capability, answer: PermissionAnswer) {
        match capability {
            Capability::Camera => self.camera = answer,
            Capability::Gallery => self.gallery = answer,
            Capability::Location => self.location = answer,
            Capability::Notifications => self.notifications = answer,
        }
    }
}

/// Permission provider answering from preset configuration.
///
/// Undecided capabilities cannot be prompted for and end up denied.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredPermissions {
    answers: PermissionAnswers,
}

impl ConfiguredPermissions {
    #[must_use]
    pub const fn new(answers: PermissionAnswers) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl PermissionProvider for ConfiguredPermissions {
    async fn status(&self, capability: Capability) -> Result<PermissionStatus> {
        Ok(self.answers.get(capability).status())
    }

    async fn request(&self, capability: Capability) -> Result<PermissionStatus> {
        tracing::debug!("No prompt available for {capability}, denying");
        Ok(PermissionStatus::Denied)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiaryConfig {
    /// Directory browsed as the photo gallery.
    pub gallery_dir: Option<PathBuf>,
    pub sample_limit: usize,
    pub location_timeout_secs: u64,
    /// Fixed position reported as the device location.
    pub position: Option<Coordinates>,
    pub geocoder_url: String,
    pub location_policy: LocationPolicy,
    pub permissions: PermissionAnswers,
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            gallery_dir: None,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            location_timeout_secs: DEFAULT_FIX_TIMEOUT.as_secs(),
            position: None,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            location_policy: LocationPolicy::default(),
            permissions: PermissionAnswers::default(),
        }
    }
}

impl DiaryConfig {
    #[must_use]
    pub fn sample_limit(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.sample_limit).unwrap_or(NonZeroUsize::MIN)
    }

    #[must_use]
    pub const fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.sample_limit == 0 {
            return Err(Error::Config("sample_limit must be at least 1".to_string()));
        }
        if self.location_timeout_secs == 0 {
            return Err(Error::Config(
                "location_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !is_http_url(&self.geocoder_url) {
            return Err(Error::Config(format!(
                "geocoder_url must include http:// or https:// (got '{}')",
                self.geocoder_url
            )));
        }
        if let Some(position) = &self.position {
            position
                .validate()
                .map_err(|error| Error::Config(format!("position: {error}")))?;
        }
        if let LocationPolicy::Fallback { label } = &self.location_policy {
            if label.trim().is_empty() {
                return Err(Error::Config(
                    "fallback location label must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load the config, falling back to defaults when missing or unusable.
pub fn load_config_from_path(path: &Path) -> DiaryConfig {
    if !path.exists() {
        return DiaryConfig::default();
    }

    let config = match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<DiaryConfig>(&content) {
            Ok(config) => config,
            Err(error) => {
                tracing::warn!("Failed to parse config at {}: {}", path.display(), error);
                return DiaryConfig::default();
            }
        },
        Err(error) => {
            tracing::warn!("Failed to read config at {}: {}", path.display(), error);
            return DiaryConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => config,
        Err(error) => {
            tracing::warn!("Ignoring invalid config at {}: {}", path.display(), error);
            DiaryConfig::default()
        }
    }
}

pub fn save_config_to_path(config: &DiaryConfig, path: &Path) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
