//! HTTP surface: resource routes under `/api`, liveness probes and the
//! bearer-token gate.

mod api;
mod auth;
mod error;
mod logging;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;

use eventoffer_core::AppState;
use eventoffer_storage::Storage;

pub use auth::require_bearer;
pub use error::ApiError;
pub use logging::{REQUEST_ID_HEADER, log_request};

pub fn app_router(state: Arc<AppState>) -> Router {
    let mut resources = api::resource_routes();
    if state.global.require_auth {
        resources = resources.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));
    }
    let protected = auth::protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_bearer,
    ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/db", get(health_db))
        .nest("/api", resources.merge(protected))
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Event-Offer Management API" }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn health_db(State(state): State<Arc<AppState>>) -> Response {
    match state.storage.health().await {
        Ok(()) => {
            Json(serde_json::json!({ "status": "healthy", "database": "ok" })).into_response()
        }
        Err(err) => {
            warn!(error = %err, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unhealthy", "detail": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}
