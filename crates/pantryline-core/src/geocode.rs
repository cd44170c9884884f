//! Geocoding providers — address text to coordinates.
//!
//! Two backends behind one [`GeocodeProvider`] capability, selected once at
//! configuration time by [`create_geocoder`]:
//!
//! - [`GoogleGeocoder`] — keyed Maps Geocoding API. Batch requests fan out
//!   concurrently.
//! - [`NominatimGeocoder`] — keyless OpenStreetMap search, limited to one
//!   request per second by the provider's usage policy. All requests are
//!   serialized with a fixed 1100 ms inter-request gap, and the client
//!   identifies itself with a fixed `User-Agent`.
//!
//! `geocode` returns `Ok(None)` for "address not found"; transport failures
//! are real errors so the caller can distinguish the two.

use crate::config::CoreConfig;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Fixed client identifier required by the Nominatim usage policy.
const NOMINATIM_USER_AGENT: &str = "PantryAssistant/1.0";

/// Minimum gap between Nominatim requests (1 req/s policy, with headroom).
const NOMINATIM_REQUEST_GAP: Duration = Duration::from_millis(1100);

/// Which backend produced a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Nominatim,
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
    pub provider: ProviderKind,
}

impl GeoCoordinate {
    /// Build a coordinate, rejecting out-of-range latitude/longitude.
    pub fn new(lat: f64, lng: f64, provider: ProviderKind) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(AssistantError::Config(format!(
                "latitude out of range: {}",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AssistantError::Config(format!(
                "longitude out of range: {}",
                lng
            )));
        }
        Ok(Self { lat, lng, provider })
    }
}

/// Capability: convert address text to a coordinate.
#[async_trait]
pub trait GeocodeProvider: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ProviderKind;

    /// Geocode one address. `Ok(None)` means the provider found nothing.
    async fn geocode(&self, address: &str) -> Result<Option<GeoCoordinate>>;

    /// Geocode a batch of candidate addresses. Per-address failures are
    /// absorbed to `None` so one bad candidate never aborts the batch.
    /// Default strategy: concurrent fan-out. Rate-limited providers override
    /// this with a serial walk.
    async fn geocode_batch(&self, addresses: &[String]) -> Vec<Option<GeoCoordinate>> {
        let calls = addresses.iter().map(|a| self.geocode(a));
        futures::future::join_all(calls)
            .await
            .into_iter()
            .zip(addresses)
            .map(|(result, address)| match result {
                Ok(coord) => coord,
                Err(e) => {
                    warn!(target: "pantryline::geocode", "batch geocode failed for {:?}: {}", address, e);
                    None
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Google (keyed primary)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

/// Keyed Google Maps Geocoding API client.
#[derive(Debug)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, GOOGLE_GEOCODE_URL, timeout)
    }

    /// Point at an alternate endpoint (tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Config(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl GeocodeProvider for GoogleGeocoder {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn geocode(&self, address: &str) -> Result<Option<GeoCoordinate>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", &self.api_key)])
            .send()
            .await?;
        let body: GoogleResponse = response.json().await?;

        if body.status != "OK" || body.results.is_empty() {
            debug!(target: "pantryline::geocode", "google returned {} for {:?}", body.status, address);
            return Ok(None);
        }

        let location = &body.results[0].geometry.location;
        match GeoCoordinate::new(location.lat, location.lng, ProviderKind::Google) {
            Ok(coord) => Ok(Some(coord)),
            Err(e) => {
                warn!(target: "pantryline::geocode", "google returned invalid coordinate for {:?}: {}", address, e);
                Ok(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Nominatim (keyless fallback, rate-limited)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Keyless OpenStreetMap Nominatim client.
///
/// Holds a throttle lock across every request so concurrent callers are
/// serialized and spaced by [`NOMINATIM_REQUEST_GAP`]. This is a hard
/// requirement of the provider's 1-request/second policy, not a tuning knob.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(NOMINATIM_SEARCH_URL, timeout)
    }

    /// Point at an alternate endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(NOMINATIM_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            last_request: Mutex::new(None),
        })
    }

    async fn request(&self, address: &str) -> Result<Option<GeoCoordinate>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("format", "json"),
                ("q", address),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;
        let places: Vec<NominatimPlace> = response.json().await?;

        let Some(place) = places.first() else {
            debug!(target: "pantryline::geocode", "nominatim found nothing for {:?}", address);
            return Ok(None);
        };
        let lat: f64 = place
            .lat
            .parse()
            .map_err(|_| AssistantError::Transport(format!("bad latitude: {}", place.lat)))?;
        let lng: f64 = place
            .lon
            .parse()
            .map_err(|_| AssistantError::Transport(format!("bad longitude: {}", place.lon)))?;
        match GeoCoordinate::new(lat, lng, ProviderKind::Nominatim) {
            Ok(coord) => Ok(Some(coord)),
            Err(e) => {
                warn!(target: "pantryline::geocode", "nominatim returned invalid coordinate for {:?}: {}", address, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Nominatim
    }

    async fn geocode(&self, address: &str) -> Result<Option<GeoCoordinate>> {
        // The lock is held across the request so overlapping callers cannot
        // slip inside the gap.
        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let since = previous.elapsed();
            if since < NOMINATIM_REQUEST_GAP {
                tokio::time::sleep(NOMINATIM_REQUEST_GAP - since).await;
            }
        }
        let result = self.request(address).await;
        *last_request = Some(Instant::now());
        result
    }

    /// Serial walk: the per-call throttle already enforces the request gap.
    async fn geocode_batch(&self, addresses: &[String]) -> Vec<Option<GeoCoordinate>> {
        let mut coords = Vec::with_capacity(addresses.len());
        for address in addresses {
            match self.geocode(address).await {
                Ok(coord) => coords.push(coord),
                Err(e) => {
                    warn!(target: "pantryline::geocode", "batch geocode failed for {:?}: {}", address, e);
                    coords.push(None);
                }
            }
        }
        coords
    }
}

// ---------------------------------------------------------------------------
// Selection and user-address resolution
// ---------------------------------------------------------------------------

/// Select the geocoder once from configuration: keyed Google when a credential
/// is present, otherwise the keyless Nominatim fallback (unless disabled).
pub fn create_geocoder(config: &CoreConfig) -> Result<Arc<dyn GeocodeProvider>> {
    if let Some(key) = &config.google_api_key {
        info!(target: "pantryline::geocode", "geocoder: Google (keyed)");
        return Ok(Arc::new(GoogleGeocoder::new(
            key.clone(),
            config.geocode_timeout(),
        )?));
    }
    if config.allow_fallback {
        info!(target: "pantryline::geocode", "geocoder: Nominatim (keyless fallback, rate-limited)");
        return Ok(Arc::new(NominatimGeocoder::new(config.geocode_timeout())?));
    }
    Err(AssistantError::ProviderUnavailable)
}

/// Resolve the caller's own address: one attempt, then at most one retry with
/// the default locality appended when the first attempt found nothing.
pub async fn resolve_user_address(
    provider: &dyn GeocodeProvider,
    address: &crate::address::Address,
) -> Result<GeoCoordinate> {
    if let Some(coord) = provider.geocode(&address.normalized).await? {
        return Ok(coord);
    }

    if let Some(locality) = &address.default_locality {
        let already_localized = address
            .normalized
            .to_lowercase()
            .contains(&locality.to_lowercase());
        if !already_localized {
            let retry = format!("{}, {}", address.normalized, locality);
            info!(target: "pantryline::geocode", "retrying geocode with locality: {:?}", retry);
            if let Some(coord) = provider.geocode(&retry).await? {
                return Ok(coord);
            }
        }
    }

    Err(AssistantError::GeocodeNotFound(address.normalized.clone()))
}
