//! Axum webhook gateway for the pantry voice assistant.
//!
//! A hosted voice-agent platform POSTs the caller's transcript here and
//! speaks back whatever lands in `{ "response": ... }`. Engine failures are
//! mapped to their spoken apologies; internal error detail never leaves the
//! process. A `GET` on the same path answers liveness probes.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use pantryline_core::PantryResolver;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub const AGENT_PATH: &str = "/api/v1/agent";

/// Body fields probed for the caller's utterance, first non-empty wins.
const UTTERANCE_FIELDS: &[&str] = &[
    "message",
    "address",
    "user_input",
    "input",
    "query",
    "transcript",
    "content",
];

const EMPTY_UTTERANCE_REPLY: &str =
    "I'm sorry, I didn't catch that. Could you please tell me your address?";

pub struct AppState {
    pub resolver: PantryResolver,
    pub webhook_secret: Option<String>,
}

/// Build the gateway router. CORS is wide open: the webhook caller is a
/// third-party platform with no fixed origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route(AGENT_PATH, post(agent_webhook).get(agent_liveness))
        .layer(cors)
        .with_state(state)
}

async fn agent_liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Pantry agent webhook is ready",
        "endpoint": AGENT_PATH,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn agent_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<Value>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&state, &headers) {
        warn!(target: "pantryline::gateway", "webhook call rejected: bad bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        );
    }

    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let Some(utterance) = extract_utterance(&body) else {
        info!(target: "pantryline::gateway", "webhook call without an utterance");
        return (StatusCode::OK, Json(json!({ "response": EMPTY_UTTERANCE_REPLY })));
    };

    info!(target: "pantryline::gateway", "webhook utterance: {:?}", utterance);
    match state.resolver.resolve(&utterance).await {
        Ok(resolution) => {
            let response = PantryResolver::narrate(&resolution);
            (StatusCode::OK, Json(json!({ "response": response })))
        }
        Err(err) if err.is_internal() => {
            warn!(target: "pantryline::gateway", "resolution failed internally: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "response": err.apology() })),
            )
        }
        Err(err) => {
            info!(target: "pantryline::gateway", "resolution failed: {}", err);
            (StatusCode::OK, Json(json!({ "response": err.apology() })))
        }
    }
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(secret) = &state.webhook_secret else {
        return true;
    };
    let expected = format!("Bearer {}", secret);
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
}

/// First non-empty utterance field in the JSON body.
fn extract_utterance(body: &Value) -> Option<String> {
    for field in UTTERANCE_FIELDS {
        if let Some(text) = body.get(field).and_then(Value::as_str) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}
