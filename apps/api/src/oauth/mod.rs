/// OAuth client-credentials client for the skills provider.
///
/// Every bearer token used against the classification API is minted here.
/// Tokens are pooled and rotated by `pool::TokenPool`.
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub mod pool;

/// Tokens this close to their expiry are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token endpoint error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Token response did not contain an access_token")]
    MissingToken,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A bearer token with the expiry reported by the token endpoint, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// A token without a reported lifetime never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - Duration::seconds(EXPIRY_SKEW_SECS),
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct OAuthClient {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl OAuthClient {
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: String,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            token_url,
            client_id,
            client_secret,
            scope,
        }
    }

    /// Requests one fresh token with the client-credentials grant. No retries.
    pub async fn fetch_token(&self) -> Result<AccessToken, AuthError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        let response = self.client.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let value = token
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::MissingToken)?;
        let expires_at = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        debug!("Obtained access token (expires_at={:?})", expires_at);

        Ok(AccessToken::new(value, expires_at))
    }
}
