//! Gateway entry point: load config, wire the resolver, serve the webhook.

use pantryline_core::{CoreConfig, PantryResolver};
use pantryline_gateway::{build_router, AppState, AGENT_PATH};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pantryline_core=info,pantryline_gateway=info,info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    let config = CoreConfig::from_env();
    let resolver = PantryResolver::from_config(&config)?;
    let state = Arc::new(AppState {
        resolver,
        webhook_secret: config.webhook_secret.clone(),
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        target: "pantryline::gateway",
        "listening on {} (webhook at {})", config.bind_addr, AGENT_PATH
    );
    axum::serve(listener, app).await?;
    Ok(())
}
