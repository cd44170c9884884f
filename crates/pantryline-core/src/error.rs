//! Error types for the pantry assistant engine.
//!
//! Every user-visible failure kind maps to a distinct spoken apology via
//! [`AssistantError::apology`]; internal detail (URLs, status codes, keys)
//! never appears in apology text.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors that can occur while resolving a caller's address to a pantry.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("address too short after cleanup: {0:?}")]
    AddressTooShort(String),

    #[error("no location found for address: {0}")]
    GeocodeNotFound(String),

    #[error("no geocoding provider configured")]
    ProviderUnavailable,

    #[error("no pantries with active status")]
    NoActivePantries,

    #[error("no pantries could be located near the caller")]
    NoPantriesNearby,

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("pantry directory error: {0}")]
    PantryGateway(String),

    #[error("speech error: {0}")]
    Speech(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Transport(err.to_string())
    }
}

impl AssistantError {
    /// Spoken apology for this failure, safe to hand to the caller verbatim.
    pub fn apology(&self) -> String {
        match self {
            AssistantError::AddressTooShort(_) => {
                "I need a valid address to find the nearest pantry. Please provide your \
                 address, for example: '112 Alden Street' or '112 Alden Street, Syracuse, NY'."
                    .to_string()
            }
            AssistantError::GeocodeNotFound(address) => format!(
                "I'm sorry, I couldn't find the location for \"{}\". Could you please try \
                 providing the full address including city and state?",
                address
            ),
            AssistantError::ProviderUnavailable => {
                "I'm sorry, the location service is not configured. Please contact support."
                    .to_string()
            }
            AssistantError::NoActivePantries => {
                "I'm sorry, but there are no active pantries available at the moment.".to_string()
            }
            AssistantError::NoPantriesNearby => {
                "I'm sorry, but I couldn't find any pantries near your location.".to_string()
            }
            AssistantError::Transport(_) | AssistantError::PantryGateway(_) => {
                "I'm sorry, I'm having trouble accessing the pantry database. Please try \
                 again later."
                    .to_string()
            }
            AssistantError::Speech(_) | AssistantError::Config(_) => {
                "I'm sorry, I encountered an error while processing your request. Please \
                 try again."
                    .to_string()
            }
        }
    }

    /// True for failures the caller cannot fix by rephrasing: infrastructure
    /// problems that the webhook boundary reports with a server-error status.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AssistantError::ProviderUnavailable
                | AssistantError::Transport(_)
                | AssistantError::PantryGateway(_)
                | AssistantError::Speech(_)
                | AssistantError::Config(_)
        )
    }
}
