use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{auth::require_api_key, handlers, state::AppState};

/// Build the complete router. Protected routes sit behind the shared-secret gate.
pub fn build(state: AppState) -> Router {
    let protected = Router::new()
        .route("/intake", post(handlers::intake))
        .route("/promote/:submission_id", post(handlers::promote))
        .route("/decision", post(handlers::decision))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/issues", get(handlers::list_issues))
        .route("/faq/check", post(handlers::faq_check));

    let body_limit = state.body_limit_bytes();
    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
