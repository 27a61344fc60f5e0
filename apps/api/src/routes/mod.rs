pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::corpus::handlers as corpus_handlers;
use crate::matching::handlers as matching_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Corpus uploads
        .route("/upload-jobs/", post(corpus_handlers::handle_upload_jobs))
        .route(
            "/upload-cv/",
            post(corpus_handlers::handle_upload_cv).layer(upload_limit),
        )
        // Matching
        .route("/match-jobs/", get(matching_handlers::handle_match_jobs))
        .with_state(state)
}
