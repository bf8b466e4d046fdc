//! HTTP API for the chat gateway

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::gateway::ChatGateway;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 100 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ChatGateway>,
    /// Take the client identity from `X-Forwarded-For` when behind a proxy
    pub trust_proxy: bool,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(gateway: Arc<ChatGateway>, trust_proxy: bool) -> Self {
        Self {
            gateway,
            trust_proxy,
            started_at: Instant::now(),
        }
    }
}

/// Router with CORS, tracing and the body limit applied
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    create_router(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS restricted to an explicit origin list
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring unparseable allowed origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
