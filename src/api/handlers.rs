//! HTTP request handlers

use super::types::{ChatResponse, ErrorResponse, HealthResponse};
use super::AppState;
use crate::gateway::{ChatReply, GatewayError, REASON_LENGTH, REASON_NOT_STRING};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;

const RATELIMIT_LIMIT: &str = "ratelimit-limit";
const RATELIMIT_REMAINING: &str = "ratelimit-remaining";

pub const VALIDATION_MESSAGE: &str = "Invalid input";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";
pub const INTERNAL_MESSAGE: &str = "Internal server error. Please try again later.";

/// Create the API router.
///
/// Routes are served at the root and again under `/api`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .with_state(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_rejection(&rejection).into_response(),
    };
    let client = client_identity(&headers, connect.map(|c| c.0), state.trust_proxy);

    match state.gateway.handle(&body, &client).await {
        Ok(reply) => reply.into_response(),
        Err(e) => e.into_response(),
    }
}

/// A body that could not be read is reported like any other invalid input
fn body_rejection(rejection: &BytesRejection) -> GatewayError {
    tracing::debug!(
        status = %rejection.status(),
        error = %rejection.body_text(),
        "Unreadable chat body"
    );
    let reason = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        REASON_LENGTH
    } else {
        REASON_NOT_STRING
    };
    GatewayError::Validation(vec![reason.to_string()])
}

/// Identity used as the rate-limit key.
///
/// `X-Forwarded-For` is only honoured when the server is configured to sit
/// behind a proxy; otherwise any client could pick its own key.
pub(crate) fn client_identity(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string())
}

fn header_value(n: impl Into<u64>) -> HeaderValue {
    HeaderValue::from(n.into())
}

impl IntoResponse for ChatReply {
    fn into_response(self) -> Response {
        (
            [
                (RATELIMIT_LIMIT, header_value(self.quota.limit)),
                (RATELIMIT_REMAINING, header_value(self.quota.remaining)),
            ],
            Json(ChatResponse { reply: self.reply }),
        )
            .into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(reasons) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(VALIDATION_MESSAGE).with_details(reasons)),
            )
                .into_response(),
            GatewayError::RateLimited {
                retry_after_secs,
                limit,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [
                    ("retry-after", header_value(retry_after_secs)),
                    (RATELIMIT_LIMIT, header_value(limit)),
                    (RATELIMIT_REMAINING, header_value(0u32)),
                ],
                Json(ErrorResponse::new(RATE_LIMITED_MESSAGE)),
            )
                .into_response(),
            GatewayError::Upstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(INTERNAL_MESSAGE)),
            )
                .into_response(),
        }
    }
}

// ============================================================
// Health
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        model: state.gateway.model_id().to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
