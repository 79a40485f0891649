use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret gate for mutating endpoints. With no secret configured every
/// request passes.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_key() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let header_present = provided.is_some();
    if provided == Some(expected) {
        return next.run(request).await;
    }

    tracing::debug!(
        target: "portal.auth",
        path = %request.uri().path(),
        header_present,
        "api_key_rejected"
    );
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}
