//! HTTP surface: the weather relay route.

use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::weather::{self, NormalizeOptions};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared state for the route handlers.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn Fetcher>,
    pub normalize: NormalizeOptions,
}

/// Any upstream failure is reported as a 500 with `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(FetchError);

impl From<FetchError> for ApiError {
    fn from(value: FetchError) -> Self {
        ApiError(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/GetWeather", get(get_weather))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn get_weather(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    info!("GET /api/GetWeather");
    let weather = weather::fetch_weather(state.weather.as_ref(), state.normalize)
        .await
        .map_err(|e| {
            error!("Weather fetch from {} failed: {}", e.endpoint(), e);
            ApiError::from(e)
        })?;
    Ok(Json(weather))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .await
        .context("HTTP server terminated")
}
