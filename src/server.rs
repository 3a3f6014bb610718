//! Local translation proxy
//!
//! Exposes the LibreTranslate request shape on `POST /translate` and forwards
//! each request to the configured upstreams in order.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::ProxyConfig;
use crate::error::{Result, CibusError};
use crate::translate::{FallbackChain, TranslatorFactory};

/// Shared state for proxy handlers
#[derive(Clone)]
pub struct ProxyState {
    pub chain: Arc<FallbackChain>,
}

#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_source() -> String {
    "auto".to_string()
}

fn default_target() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub translated_text: String,
    pub detected_language: String,
}

pub fn router(chain: Arc<FallbackChain>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/translate", post(translate))
        .with_state(ProxyState { chain })
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ProxyConfig) -> Result<()> {
    let chain = Arc::new(TranslatorFactory::create_proxy_chain(config)?);
    let app = router(chain);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CibusError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    info!("Translation proxy listening on {}", addr);
    info!("Primary upstream: {}", config.primary_url);
    info!("Fallback upstream: {}", config.fallback_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down translation proxy");
        })
        .await
        .map_err(|e| CibusError::Server(e.to_string()))
}

/// Health check endpoint
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "Lightweight Translation API", "status": "running" }))
}

async fn translate(
    State(state): State<ProxyState>,
    Json(request): Json<ProxyRequest>,
) -> Response {
    if request.q.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "No text provided" }))).into_response();
    }

    match state
        .chain
        .translate_with_backend(&request.q, &request.source, &request.target)
        .await
    {
        Ok((translated_text, backend)) => {
            info!("{} -> {} via {}", request.source, request.target, backend);
            Json(ProxyResponse {
                translated_text,
                detected_language: request.source.clone(),
            })
            .into_response()
        }
        Err(e) => {
            warn!("Proxy translation failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
