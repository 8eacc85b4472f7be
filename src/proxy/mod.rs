//! Vision proxy server
//!
//! Thin HTTP-to-HTTP forwarders in front of the upstream vision providers:
//! no retry, no backoff, no auth beyond the API key lookup. The client
//! talks to these routes instead of holding provider keys itself.

mod gemini;
mod openai;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::Result;

/// Frames arrive base64-encoded; allow generously sized bodies
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Error payload shared by both routes
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Shared state for proxy handlers
pub struct ProxyState {
    client: reqwest::Client,
    openai_key: Option<String>,
    gemini_key: Option<String>,
}

impl ProxyState {
    /// Build proxy state from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            openai_key: config.api_keys.openai.clone(),
            gemini_key: config.api_keys.gemini.clone(),
        }
    }
}

/// Build the proxy router
pub fn router(state: Arc<ProxyState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/openai-proxy", post(openai::openai_proxy))
        .route("/api/gemini-vision", post(gemini::gemini_vision))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the proxy server until the process is stopped
///
/// # Errors
///
/// Returns error if the listen port cannot be bound
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(ProxyState::new(config));
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.proxy.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "vision proxy listening");

    axum::serve(listener, app).await?;
    Ok(())
}
