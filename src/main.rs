//! Chat relay gateway server

use chat_relay::api::{create_app, AppState};
use chat_relay::config::Config;
use chat_relay::gateway::{ChatGateway, RateLimiter};
use chat_relay::llm::{LoggingService, OpenAIService};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    // Provider
    let provider = OpenAIService::new(
        config.api_key.clone(),
        config.model.clone(),
        &config.base_url,
        config.upstream_timeout,
    )?;
    let llm = Arc::new(LoggingService::new(Arc::new(provider)));
    tracing::info!(model = %config.model, base_url = %config.base_url, "LLM provider initialized");

    // Gateway
    let limiter = Arc::new(RateLimiter::new(config.rate_limit));
    let gateway = Arc::new(ChatGateway::new(llm, limiter.clone(), config.system_prompt.clone()));

    // Expired windows are dropped once per window length
    let window = config.rate_limit.window;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!(
                    removed,
                    tracked = limiter.tracked_keys(),
                    "Swept rate-limit windows"
                );
            }
        }
    });

    let app = create_app(AppState::new(gateway, config.trust_proxy), &config.allowed_origins);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        origins = ?config.allowed_origins,
        max_requests = config.rate_limit.max_requests,
        window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        "Chat relay listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
