use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::core::metrics;
use crate::core::redis::RedisHealth;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "OpenCourse API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs_url: format!("{}/docs", state.settings().api().api_v1_str),
    })
}

/// Redis trouble degrades the service; a failing database marks it unhealthy.
pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let redis = match state.redis().health().await {
        RedisHealth::Healthy => ("healthy".to_string(), None),
        RedisHealth::Disconnected => ("disconnected".to_string(), None),
        RedisHealth::Unhealthy(error) => (format!("unhealthy: {error}"), Some("degraded")),
    };

    let database = match sqlx::query("SELECT 1").execute(state.db()).await {
        Ok(_) => ("healthy".to_string(), None),
        Err(err) => (format!("unhealthy: {err}"), Some("unhealthy")),
    };

    let status = database.1.or(redis.1).unwrap_or("healthy").to_string();

    let mut components = HashMap::new();
    components.insert("redis".to_string(), redis.0);
    components.insert("database".to_string(), database.0);

    Json(HealthResponse { service: "opencourse-api".to_string(), status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
