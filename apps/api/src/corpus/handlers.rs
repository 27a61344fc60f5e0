//! Axum route handlers for the upload endpoints.

use std::collections::BTreeSet;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::corpus::jobs::load_jobs_dir;
use crate::corpus::resume::{extract_pdf_text, read_resume_pdf};
use crate::errors::AppError;
use crate::models::job::ResumeProfile;
use crate::state::AppState;

const UPLOAD_SOURCE: &str = "upload";
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadJobsResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadCvResponse {
    pub message: String,
    pub skills: Vec<String>,
}

/// POST /upload-jobs/
///
/// Replaces the stored job list with every posting found in the jobs directory.
pub async fn handle_upload_jobs(
    State(state): State<AppState>,
) -> Result<Json<UploadJobsResponse>, AppError> {
    let dir = state.config.jobs_dir();
    let jobs = load_jobs_dir(&dir).await?;
    let count = state.store.replace_jobs(jobs).await;

    Ok(Json(UploadJobsResponse {
        message: format!("{count} jobs uploaded from {}.", dir.display()),
        count,
    }))
}

/// POST /upload-cv/
///
/// Takes the PDF from a multipart `file` part when one is sent, otherwise the
/// configured résumé path. The stored résumé is only replaced once the PDF has
/// been read and its text extracted.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Option<Multipart>,
) -> Result<Json<UploadCvResponse>, AppError> {
    let (pdf, source) = match multipart {
        Some(multipart) => (read_file_part(multipart).await?, UPLOAD_SOURCE.to_string()),
        None => {
            let path = state.config.resume_path();
            (read_resume_pdf(&path).await?, path.display().to_string())
        }
    };

    let text = extract_pdf_text(pdf).await?;
    let skills = classify_resume(&state, &text).await;

    info!("Résumé from {source} has {} distinct skills", skills.len());

    let response_skills: Vec<String> = skills.iter().cloned().collect();
    state
        .store
        .replace_resume(ResumeProfile { skills, source })
        .await;

    Ok(Json(UploadCvResponse {
        message: "CV uploaded and skills extracted.".to_string(),
        skills: response_skills,
    }))
}

async fn read_file_part(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error("Failed to read upload", e))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' part"
    )))
}

/// Body-limit rejections surface as 413; any other multipart fault is a 400.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {}", err.body_text()))
    } else {
        AppError::Validation(format!("{context}: {}", err.body_text()))
    }
}

/// Classification failures leave the résumé with no skills rather than failing
/// the upload.
async fn classify_resume(state: &AppState, text: &str) -> BTreeSet<String> {
    let token = match state.tokens.first_or_fresh(&state.auth).await {
        Ok(token) => token,
        Err(e) => {
            error!("No access token for résumé classification: {e}");
            return BTreeSet::new();
        }
    };

    match state.extractor.extract(text, &token).await {
        Ok(skills) => skills.into_iter().collect(),
        Err(e) => {
            warn!("Résumé classification failed, storing no skills: {e}");
            BTreeSet::new()
        }
    }
}
