//! Reverse geocoding against a Nominatim-compatible HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Coordinates, Geocoder, Place};
use crate::util::{compact_text, is_http_url, normalize_text_option};
use crate::{Error, Result};

const GEOCODER_HTTP_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("roam/", env!("CARGO_PKG_VERSION"));

/// HTTP reverse geocoder using the `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimGeocoder {
    /// Builds a geocoder for an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into().as_str())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GEOCODER_HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| Error::Platform(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { base_url, client })
    }

    /// Returns the base URL this geocoder was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<Place>> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| Error::Platform(format!("Reverse geocoding request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Platform(format!(
                "Reverse geocoding failed with HTTP {status}: {}",
                compact_text(&body)
            )));
        }

        let body = response.text().await.map_err(|error| {
            Error::Platform(format!("Failed to read reverse geocoding response: {error}"))
        })?;
        parse_reverse_response(&body)
    }
}

/// Parse a `/reverse` response body into place candidates.
///
/// Public so parsing can be exercised without network access.
/// A response carrying an `error` field (e.g. "Unable to geocode") means no
/// candidates rather than a failure.
pub fn parse_reverse_response(payload: &str) -> Result<Vec<Place>> {
    let response: ReverseResponse = serde_json::from_str(payload).map_err(|error| {
        Error::Platform(format!("invalid reverse geocoding JSON: {error}"))
    })?;

    if let Some(message) = response.error {
        tracing::debug!("Geocoder reported no match: {message}");
        return Ok(Vec::new());
    }

    Ok(response
        .address
        .map(|address| Place {
            city: normalize_text_option(address.city)
                .or_else(|| normalize_text_option(address.town))
                .or_else(|| normalize_text_option(address.village))
                .or_else(|| normalize_text_option(address.municipality)),
            country: normalize_text_option(address.country),
        })
        .into_iter()
        .collect())
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ReverseAddress>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::Config("geocoder URL must not be empty".to_string()));
    }
    if !is_http_url(&base) {
        return Err(Error::Config(
            "geocoder URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}
