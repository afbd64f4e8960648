use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/export", get(handlers::export))
        .route("/health", get(handlers::health))
        .with_state(state)
}
