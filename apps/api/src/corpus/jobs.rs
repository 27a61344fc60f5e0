use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::corpus::CorpusError;
use crate::models::job::JobPosting;

/// Reads every file in `dir` as a JSON array of job postings and concatenates
/// them in file-name order. Sub-directories are skipped.
pub async fn load_jobs_dir(dir: &Path) -> Result<Vec<JobPosting>, CorpusError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CorpusError::DirectoryNotFound(dir.to_path_buf()))
        }
        Err(e) => return Err(io_error(dir, e)),
    };

    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
        let file_type = entry.file_type().await.map_err(|e| io_error(dir, e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut jobs = Vec::new();
    for path in files {
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        let batch: Vec<JobPosting> =
            serde_json::from_slice(&raw).map_err(|source| CorpusError::MalformedJobs {
                path: path.clone(),
                source,
            })?;
        debug!("Loaded {} jobs from {}", batch.len(), path.display());
        jobs.extend(batch);
    }

    info!("Loaded {} jobs from {}", jobs.len(), dir.display());
    Ok(jobs)
}

fn io_error(path: &Path, source: std::io::Error) -> CorpusError {
    CorpusError::Io {
        path: path.to_path_buf(),
        source,
    }
}
