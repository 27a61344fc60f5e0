// Corpus loading: job postings from the jobs directory, résumé text from PDF.
// Upload handlers replace the contents of the MatchStore wholesale.

use std::path::PathBuf;

use thiserror::Error;

pub mod handlers;
pub mod jobs;
pub mod resume;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Directory {0} not found")]
    DirectoryNotFound(PathBuf),

    #[error("File {0} not found")]
    FileNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a JSON array of job postings: {source}")]
    MalformedJobs {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not extract text from PDF: {0}")]
    PdfExtraction(String),
}
