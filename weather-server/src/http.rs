//! HTTP surface: `GET /weather/{city}`, where the city is everything after `/weather/`.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use weather_core::{RequestContext, WeatherProvider};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
}

pub fn router(provider: Arc<dyn WeatherProvider>) -> Router {
    Router::new()
        .route("/weather/", get(weather_unnamed))
        .route("/weather/{*city}", get(weather))
        .with_state(AppState { provider })
}

/// GET /weather/{city}: averaged temperature, or 500 with the provider error as plain text.
async fn weather(State(state): State<AppState>, Path(city): Path<String>) -> Response {
    report(&state, city).await
}

// An empty city is passed through like any other.
async fn weather_unnamed(State(state): State<AppState>) -> Response {
    report(&state, String::new()).await
}

async fn report(state: &AppState, city: String) -> Response {
    let ctx = RequestContext::new(city);

    let temp = match state.provider.temperature(&ctx.city).await {
        Ok(temp) => temp,
        Err(err) => {
            tracing::warn!(
                city = %ctx.city,
                provider = err.provider().map(|id| id.as_str()),
                error = %err,
                "weather request failed"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let started_at = ctx.started_at;
    let report = ctx.finish(temp);
    tracing::info!(
        city = %report.city,
        temp = report.temp.value(),
        took = %report.took,
        %started_at,
        "weather request served"
    );

    match serde_json::to_string(&report) {
        Ok(body) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

pub async fn serve(bind: &str, provider: Arc<dyn WeatherProvider>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(provider))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
