//! HTTP front for both sidecar modes
//!
//! The whole request path space is the key namespace, so both variants use a
//! fallback handler instead of fixed routes. No caching headers are set on
//! responses; freshness is decided per request by the resolver (on-demand)
//! or by the background refresher's interval (subscribe).

use crate::resolver::BlobResolver;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared state for the on-demand HTTP server
pub struct ServerState {
    pub resolver: BlobResolver,
    /// If set, every request serves this blob regardless of path.
    pub only_key: Option<String>,
}

pub type SharedState = Arc<ServerState>;

/// Last value published by the background refresher, if any.
pub type LatestBlob = Arc<RwLock<Option<Vec<u8>>>>;

/// Create the on-demand router: any path maps to a key.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .fallback(serve_blob)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create the subscription router: any path serves the latest value.
pub fn create_subscription_router(latest: LatestBlob) -> Router {
    Router::new()
        .fallback(serve_latest)
        .layer(CorsLayer::permissive())
        .with_state(latest)
}

/// Start the HTTP server
pub async fn start_server(router: Router, host: IpAddr, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::new(host, port);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

async fn serve_blob(State(state): State<SharedState>, uri: Uri) -> Response {
    let key = match &state.only_key {
        Some(key) => key.clone(),
        None => uri.path().trim_start_matches('/').to_string(),
    };

    match state.resolver.resolve(&key).await {
        Ok(Some(value)) => value.into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(key = %key, error = %e, "Error fetching blob");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn serve_latest(State(latest): State<LatestBlob>) -> Response {
    match latest.read().await.as_ref() {
        Some(value) => value.clone().into_response(),
        None => StatusCode::OK.into_response(),
    }
}
