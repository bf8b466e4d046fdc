//! Network side of the client: one exchange with the gateway

use crate::api::{ChatRequest, ChatResponse, ErrorResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TRANSPORT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Gateway returned {status}: {error}")]
    Gateway {
        status: u16,
        error: String,
        details: Vec<String>,
    },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Capability to deliver a chat request and get the reply text back
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn exchange(&self, request: &ChatRequest) -> Result<String, TransportError>;
}

/// Talks to a running gateway over HTTP
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// `base_url` is the gateway root; requests go to `{base_url}/chat`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn exchange(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Network(format!("Request timeout: {e}"))
                } else {
                    TransportError::Network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {e}")))?;

        decode_response(status.as_u16(), &body)
    }
}

pub(crate) fn decode_response(status: u16, body: &str) -> Result<String, TransportError> {
    if !(200..300).contains(&status) {
        return Err(match serde_json::from_str::<ErrorResponse>(body) {
            Ok(err) => TransportError::Gateway {
                status,
                error: err.error,
                details: err.details.unwrap_or_default(),
            },
            Err(_) => TransportError::Gateway {
                status,
                error: format!("HTTP {status}"),
                details: vec![],
            },
        });
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::InvalidResponse(format!("Failed to parse reply: {e}")))?;
    Ok(parsed.reply)
}
