//! Axum route handler for the Match API.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::dispatcher::annotate_jobs;
use crate::matching::scoring::rank_matches;
use crate::models::job::JobMatch;
use crate::state::AppState;

/// GET /match-jobs/
///
/// Classifies every stored job description, scores it against the stored
/// résumé skills and returns the results sorted by match score.
pub async fn handle_match_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobMatch>>, AppError> {
    let (Some(jobs), Some(resume)) = (state.store.jobs().await, state.store.resume().await) else {
        return Err(AppError::Validation(
            "Jobs or CV data not uploaded.".to_string(),
        ));
    };

    if jobs.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let started = Instant::now();
    let total = jobs.len();

    let tokens = state
        .tokens
        .dispatch_tokens(&state.auth)
        .await
        .map_err(|e| AppError::Upstream(format!("No access token available: {e}")))?;

    let outcome = annotate_jobs(
        jobs,
        &tokens,
        Arc::clone(&state.extractor),
        state.config.skills_timeout(),
    )
    .await;

    if outcome.dropped > 0 {
        warn!(
            "{} of {total} jobs produced no skills and were left out of the ranking",
            outcome.dropped
        );
    }

    let matches = rank_matches(&outcome.annotated, &resume.skills);

    info!(
        "Matched {} jobs with {} workers in {}ms",
        matches.len(),
        tokens.len(),
        started.elapsed().as_millis()
    );

    Ok(Json(matches))
}
