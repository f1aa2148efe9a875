//! Config Sidecar - caching sidecar for a remote configuration-blob API
//!
//! Applications read configuration from this sidecar's local HTTP endpoint
//! instead of talking to the remote blob API directly. The sidecar caches
//! values for a freshness window and revalidates them with conditional
//! requests (on-demand mode), or keeps a single pinned blob hot with a
//! background polling loop (subscribe mode).

mod cache;
mod error;
mod refresh;
mod resolver;
mod server;
mod types;

use crate::error::{Result, SidecarError};
use crate::refresh::publish_updates;
use crate::resolver::BlobResolver;
use crate::server::{
    create_router, create_subscription_router, start_server, LatestBlob, ServerState, SharedState,
};
use crate::types::{Mode, SidecarConfig, DEFAULT_ENDPOINT, DEFAULT_FRESH_SECS, DEFAULT_HOST, DEFAULT_PORT};
use blob_api_client::{BlobClient, BlobSubscription, SubscriptionConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("config_sidecar=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    // Load configuration from environment
    let config = load_config()?;

    info!(
        address = %format!("{}:{}", config.host, config.port),
        endpoint = %config.endpoint,
        blob = config.only_key.as_deref().unwrap_or("<specified by requester>"),
        fresh_secs = config.fresh_secs,
        "Config sidecar is ready"
    );

    match config.mode {
        Mode::OnDemand => run_on_demand(config).await,
        Mode::Subscribe => run_subscribe(config).await,
    }
}

/// On-demand mode: resolve each request through the cache.
async fn run_on_demand(config: SidecarConfig) -> Result<()> {
    let client = BlobClient::new(&config.endpoint, &config.secret)?;
    let state: SharedState = Arc::new(ServerState {
        resolver: BlobResolver::new(client, config.fresh_secs),
        only_key: config.only_key.clone(),
    });

    start_server(create_router(state), config.host, config.port).await?;
    Ok(())
}

/// Subscribe mode: poll the pinned blob in the background and always serve
/// the last known good value.
async fn run_subscribe(config: SidecarConfig) -> Result<()> {
    let key = config
        .only_key
        .clone()
        .ok_or_else(|| SidecarError::Config("MODE=subscribe requires BLOB".to_string()))?;

    let (update_tx, update_rx) = mpsc::channel(64);
    let mut subscription = BlobSubscription::new(
        SubscriptionConfig {
            endpoint: config.endpoint.clone(),
            secret: config.secret.clone(),
            key,
            interval: Duration::from_secs(config.fresh_secs),
        },
        update_tx,
    )?;
    tokio::spawn(async move {
        subscription.run().await;
        error!("Blob subscription stopped");
    });

    let latest: LatestBlob = Arc::default();
    tokio::spawn(publish_updates(update_rx, latest.clone()));

    start_server(create_subscription_router(latest), config.host, config.port).await?;
    Ok(())
}

fn load_config() -> Result<SidecarConfig> {
    let secret = must_env("SECRET")?;
    let endpoint = maybe_env("ENDPOINT", DEFAULT_ENDPOINT);
    let only_key = std::env::var("BLOB").ok().filter(|v| !v.is_empty());

    let fresh_secs = match std::env::var("FRESH") {
        Ok(v) if !v.is_empty() => v.parse::<u64>().map_err(|_| {
            SidecarError::Config(format!("Invalid integer value for FRESH: {:?}", v))
        })?,
        _ => DEFAULT_FRESH_SECS,
    };

    let mode = match std::env::var("MODE") {
        Ok(v) if !v.is_empty() => Mode::parse(&v)
            .ok_or_else(|| SidecarError::Config(format!("Invalid value for MODE: {:?}", v)))?,
        _ => Mode::OnDemand,
    };
    if mode == Mode::Subscribe && only_key.is_none() {
        return Err(SidecarError::Config(
            "MODE=subscribe requires BLOB".to_string(),
        ));
    }

    let host = maybe_env("HOST", DEFAULT_HOST)
        .parse()
        .map_err(|e| SidecarError::Config(format!("Invalid HOST: {}", e)))?;
    let port = match std::env::var("PORT") {
        Ok(v) if !v.is_empty() => v
            .parse::<u16>()
            .map_err(|_| SidecarError::Config(format!("Invalid value for PORT: {:?}", v)))?,
        _ => DEFAULT_PORT,
    };

    Ok(SidecarConfig {
        mode,
        secret,
        endpoint,
        fresh_secs,
        only_key,
        host,
        port,
    })
}

/// Fetch an environment variable that is required to exist.
fn must_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SidecarError::Config(format!("Missing environment variable {}", key)))
}

/// Fetch an optional environment variable with a fallback value.
fn maybe_env(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}
