//! Engine configuration loaded from the environment.
//!
//! The gateway binary loads `.env` via `dotenvy` before calling
//! [`CoreConfig::from_env`]; the library itself only reads process env.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | GOOGLE_MAPS_API_KEY | unset | Presence selects the keyed Google geocoder. |
//! | DEFAULT_CITY_STATE | unset | Locality appended to bare street addresses (e.g. "Syracuse, NY"). |
//! | PANTRYLINE_ALLOW_NOMINATIM | true | Permit the keyless OSM fallback when no key is set. |
//! | PANTRY_API_URL | unset | Base URL of the pantry directory HTTP action. |
//! | WEBHOOK_SECRET | unset | Optional bearer token required by the webhook. |
//! | PANTRYLINE_BIND | 0.0.0.0:8080 | Gateway listen address. |
//! | GEOCODE_TIMEOUT_SECS | 10 | Per-request timeout for outbound geocode calls. |

use std::time::Duration;

/// Configuration for the resolution engine and gateway, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// GOOGLE_MAPS_API_KEY: keyed primary geocoder credential.
    pub google_api_key: Option<String>,
    /// DEFAULT_CITY_STATE: fallback locality for incomplete street addresses.
    pub default_locality: Option<String>,
    /// PANTRYLINE_ALLOW_NOMINATIM: allow the keyless fallback provider.
    pub allow_fallback: bool,
    /// PANTRY_API_URL: base URL of the pantry directory service.
    pub pantry_api_url: Option<String>,
    /// WEBHOOK_SECRET: bearer token the webhook checks when set.
    pub webhook_secret: Option<String>,
    /// PANTRYLINE_BIND: gateway listen address.
    pub bind_addr: String,
    /// GEOCODE_TIMEOUT_SECS: per-call timeout for outbound geocode requests.
    pub geocode_timeout_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            default_locality: None,
            allow_fallback: true,
            pantry_api_url: None,
            webhook_secret: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            geocode_timeout_secs: 10,
        }
    }
}

impl CoreConfig {
    /// Load from environment. Unset or invalid values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            google_api_key: env_opt_string("GOOGLE_MAPS_API_KEY"),
            default_locality: env_opt_string("DEFAULT_CITY_STATE"),
            allow_fallback: env_bool("PANTRYLINE_ALLOW_NOMINATIM", true),
            pantry_api_url: env_opt_string("PANTRY_API_URL"),
            webhook_secret: env_opt_string("WEBHOOK_SECRET"),
            bind_addr: env_opt_string("PANTRYLINE_BIND")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            geocode_timeout_secs: env_u64("GEOCODE_TIMEOUT_SECS", 10),
        }
    }

    /// Per-request timeout for outbound geocode calls.
    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_secs)
    }

    /// True when the keyed primary provider is configured.
    pub fn has_primary_provider(&self) -> bool {
        self.google_api_key.is_some()
    }
}

fn env_opt_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => parse_bool(&v, default),
        Err(_) => default,
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
