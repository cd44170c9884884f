//! Resolution pipeline: utterance → coordinates → ranked pantries → narration.
//!
//! Order matters for failure semantics: the active-status filter runs before
//! any candidate geocode call, so an empty directory never costs a single
//! network request, and a per-candidate geocode failure only drops that
//! candidate.

use crate::address::normalize;
use crate::config::CoreConfig;
use crate::error::{AssistantError, Result};
use crate::geocode::{create_geocoder, resolve_user_address, GeocodeProvider};
use crate::pantry::{HttpPantryGateway, Pantry, PantryGateway};
use crate::ranking::{rank, RankedPantry};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one resolution: the nearest pantry plus the full ranking.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub nearest: RankedPantry,
    pub all: Vec<RankedPantry>,
}

/// Runs the full pipeline against a geocoder and a pantry directory.
pub struct PantryResolver {
    geocoder: Arc<dyn GeocodeProvider>,
    gateway: Arc<dyn PantryGateway>,
    default_locality: Option<String>,
}

impl PantryResolver {
    pub fn new(
        geocoder: Arc<dyn GeocodeProvider>,
        gateway: Arc<dyn PantryGateway>,
        default_locality: Option<String>,
    ) -> Self {
        Self {
            geocoder,
            gateway,
            default_locality,
        }
    }

    /// Wire up from configuration: provider selection plus the HTTP directory.
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        let geocoder = create_geocoder(config)?;
        let base_url = config.pantry_api_url.as_ref().ok_or_else(|| {
            AssistantError::Config("PANTRY_API_URL is not set".to_string())
        })?;
        let gateway = Arc::new(HttpPantryGateway::new(
            base_url.clone(),
            config.geocode_timeout(),
        )?);
        Ok(Self::new(geocoder, gateway, config.default_locality.clone()))
    }

    /// Resolve a raw utterance to the nearest active pantry.
    pub async fn resolve(&self, utterance: &str) -> Result<Resolution> {
        let address = normalize(utterance, self.default_locality.as_deref())?;
        info!(target: "pantryline::resolver", "resolving address: {:?}", address.normalized);

        let origin = resolve_user_address(self.geocoder.as_ref(), &address).await?;
        debug!(
            target: "pantryline::resolver",
            "caller located at ({:.4}, {:.4}) via {:?}", origin.lat, origin.lng, origin.provider
        );

        let pantries = self.gateway.list_pantries().await?;
        let active: Vec<Pantry> = pantries.into_iter().filter(Pantry::is_active).collect();
        if active.is_empty() {
            return Err(AssistantError::NoActivePantries);
        }
        debug!(target: "pantryline::resolver", "geocoding {} active pantries", active.len());

        let addresses: Vec<String> = active.iter().map(|p| p.address.clone()).collect();
        let coords = self.geocoder.geocode_batch(&addresses).await;

        let ranked = rank(&origin, active.into_iter().zip(coords).collect());
        let nearest = ranked
            .first()
            .cloned()
            .ok_or(AssistantError::NoPantriesNearby)?;
        info!(
            target: "pantryline::resolver",
            "nearest pantry: {} at {:.1} km ({} ranked)",
            nearest.pantry.name,
            nearest.distance_km,
            ranked.len()
        );

        Ok(Resolution {
            nearest,
            all: ranked,
        })
    }

    /// Spoken summary of the nearest result: name, address, rounded distance,
    /// then phone, inventory, and hours when the directory has them.
    pub fn narrate(resolution: &Resolution) -> String {
        let nearest = &resolution.nearest;
        let pantry = &nearest.pantry;

        let mut text = format!(
            "The nearest pantry to you is {}, located at {}. ",
            pantry.name, pantry.address
        );
        text.push_str(&format!(
            "It's about {} kilometers away. ",
            nearest.display_distance()
        ));
        if !pantry.phone_number.is_empty() {
            text.push_str(&format!("You can contact them at {}. ", pantry.phone_number));
        }
        if !pantry.inventory.is_empty() {
            text.push_str(&format!(
                "They typically have items like {}. ",
                pantry.inventory
            ));
        }
        if !pantry.hours.is_empty() {
            let hours: Vec<String> = pantry
                .hours
                .iter()
                .map(|h| {
                    let time = if h.time.is_empty() {
                        "Not specified"
                    } else {
                        &h.time
                    };
                    format!("{}: {}", h.day, time)
                })
                .collect();
            text.push_str(&format!("Their hours are: {}. ", hours.join(", ")));
        }
        text.trim().to_string()
    }
}
