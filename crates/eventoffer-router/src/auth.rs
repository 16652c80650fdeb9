use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::debug;

use eventoffer_auth::VerifiedClaims;
use eventoffer_core::AppState;

use crate::error::ApiError;

/// Routes that always need a valid bearer token, relative to `/api`.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/protected", get(protected))
        .route("/user-info", get(user_info))
}

/// Verifies the bearer token and hands the claims to the handler as an
/// [`Extension`].
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    match state.verifier.verify_bearer(header).await {
        Ok(claims) => {
            debug!(sub = %claims.sub, path = %req.uri().path(), "bearer token accepted");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn protected(Extension(claims): Extension<VerifiedClaims>) -> impl IntoResponse {
    let name = claims.username.as_deref().unwrap_or(&claims.sub);
    Json(serde_json::json!({
        "message": format!("Hello {name}, you have access to this protected route"),
        "user": claims,
    }))
}

async fn user_info(Extension(claims): Extension<VerifiedClaims>) -> impl IntoResponse {
    Json(serde_json::json!({
        "sub": claims.sub,
        "username": claims.username,
        "email": claims.email,
        "roles": claims.roles,
    }))
}
