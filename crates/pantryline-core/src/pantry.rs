//! Pantry directory records and the gateway that supplies them.
//!
//! The engine treats pantry records as read-only input: it filters to
//! `active` status and ranks, never mutating or persisting anything.

use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path of the directory service's list action, relative to its base URL.
const LIST_ACTION_PATH: &str = "/api/actions/pantries:listHttp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PantryStatus {
    Active,
    Inactive,
}

/// One open-hours entry, in the order the directory lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryHours {
    pub day: String,
    #[serde(default)]
    pub time: String,
}

/// One food-distribution site as provided by the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pantry {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub inventory: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub hours: Vec<PantryHours>,
    pub status: PantryStatus,
}

impl Pantry {
    pub fn is_active(&self) -> bool {
        self.status == PantryStatus::Active
    }
}

/// Supplies the candidate list. The engine never writes through this seam.
#[async_trait]
pub trait PantryGateway: Send + Sync {
    async fn list_pantries(&self) -> Result<Vec<Pantry>>;
}

/// Directory served over HTTP (the hosted pantry database's list action).
pub struct HttpPantryGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPantryGateway {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Config(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PantryGateway for HttpPantryGateway {
    async fn list_pantries(&self) -> Result<Vec<Pantry>> {
        let url = format!("{}{}", self.base_url, LIST_ACTION_PATH);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AssistantError::PantryGateway(format!(
                "directory returned {}",
                response.status()
            )));
        }
        let pantries: Vec<Pantry> = response
            .json()
            .await
            .map_err(|e| AssistantError::PantryGateway(e.to_string()))?;
        debug!(target: "pantryline::pantry", "directory listed {} pantries", pantries.len());
        Ok(pantries)
    }
}

/// In-memory directory for tests and headless demos.
#[derive(Debug, Clone, Default)]
pub struct StaticPantryGateway {
    pantries: Vec<Pantry>,
}

impl StaticPantryGateway {
    pub fn new(pantries: Vec<Pantry>) -> Self {
        Self { pantries }
    }
}

#[async_trait]
impl PantryGateway for StaticPantryGateway {
    async fn list_pantries(&self) -> Result<Vec<Pantry>> {
        Ok(self.pantries.clone())
    }
}
