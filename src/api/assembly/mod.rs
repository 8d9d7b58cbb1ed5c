mod handlers;
mod helpers;

use axum::{routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn selection_router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::select_questions))
        .route("/validate", post(handlers::validate_selection))
}

pub(crate) fn tos_router() -> Router<AppState> {
    Router::new().route("/requirements", post(handlers::tos_requirements))
}

pub(crate) fn tests_router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate_test))
        .route("/analyze", post(handlers::analyze_versions))
}
