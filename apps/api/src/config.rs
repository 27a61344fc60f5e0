use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const JOBS_SUBDIR: &str = "sample_job";
const CV_SUBDIR: &str = "sample_cv";
const CV_FILE_NAME: &str = "CV.pdf";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if any of the skills-provider credentials are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub token_url: String,
    pub skills_url: String,
    pub data_dir: PathBuf,
    pub token_pool_size: usize,
    pub skills_timeout_secs: u64,
    /// Largest request body accepted by the résumé upload.
    pub max_upload_bytes: usize,
    pub cors_origin: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            client_id: require_env("CLIENT_ID")?,
            client_secret: require_env("CLIENT_SECRET")?,
            scope: require_env("SCOPE")?,
            token_url: require_env("TOKEN_URL")?,
            skills_url: require_env("SKILLS_URL")?,
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            ),
            token_pool_size: parse_or_default(
                std::env::var("TOKEN_POOL_SIZE").ok(),
                2,
                "TOKEN_POOL_SIZE",
            )?,
            skills_timeout_secs: parse_or_default(
                std::env::var("SKILLS_TIMEOUT_SECS").ok(),
                30,
                "SKILLS_TIMEOUT_SECS",
            )?,
            max_upload_bytes: parse_or_default(
                std::env::var("MAX_UPLOAD_BYTES").ok(),
                DEFAULT_MAX_UPLOAD_BYTES,
                "MAX_UPLOAD_BYTES",
            )?,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: parse_or_default(std::env::var("PORT").ok(), 8000, "PORT")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Directory whose files each hold a JSON array of job postings.
    pub fn jobs_dir(&self) -> PathBuf {
        self.data_dir.join(JOBS_SUBDIR)
    }

    /// Fallback résumé used when an upload carries no file.
    pub fn resume_path(&self) -> PathBuf {
        self.data_dir.join(CV_SUBDIR).join(CV_FILE_NAME)
    }

    pub fn skills_timeout(&self) -> Duration {
        Duration::from_secs(self.skills_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or_default<T>(raw: Option<String>, default: T, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
        None => Ok(default),
    }
}
