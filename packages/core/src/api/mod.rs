//! HTTP API for chain reordering
//!
//! Exposes `ChainService` over axum so the same planning code can sit on the
//! server side of the persistence boundary.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin chain-server -- snapshot.json
//! ```
//!
//! # Security
//!
//! - CORS restricted to local dev origins unless `CORS_ALLOW_ORIGIN` is set
//! - No authentication

use axum::{
    http::{header, Method},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::ChainStore;
use crate::services::ChainService;

mod chain_endpoints;
mod http_error;

pub use chain_endpoints::{ChainView, HealthStatus, MoveRequest, ReorderRequest};
pub use http_error::HttpError;

/// Default port for `chain-server`
pub const DEFAULT_API_PORT: u16 = 3002;

/// Port from `CHAIN_API_PORT`, falling back to [`DEFAULT_API_PORT`]
pub fn default_api_port() -> u16 {
    std::env::var("CHAIN_API_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_API_PORT)
}

/// Full router: chain routes plus tracing and CORS layers
pub fn create_router<S>(service: Arc<ChainService<S>>) -> Router
where
    S: ChainStore + 'static,
    S::Entity: Serialize + DeserializeOwned,
{
    chain_endpoints::routes(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Allows the local frontend dev servers, or `CORS_ALLOW_ORIGIN` if set
fn cors_layer() -> CorsLayer {
    let default_origins = ["http://localhost:3000", "http://localhost:5173"];

    let origins: Vec<header::HeaderValue> = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(custom_origin) => match custom_origin.parse::<header::HeaderValue>() {
            Ok(origin) => vec![origin],
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS_ALLOW_ORIGIN: {}", custom_origin);
                Vec::new()
            }
        },
        Err(_) => default_origins
            .iter()
            .filter_map(|o| o.parse::<header::HeaderValue>().ok())
            .collect(),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve<S>(service: Arc<ChainService<S>>, addr: &str) -> anyhow::Result<()>
where
    S: ChainStore + 'static,
    S::Entity: Serialize + DeserializeOwned,
{
    let app = create_router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Chain API listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
