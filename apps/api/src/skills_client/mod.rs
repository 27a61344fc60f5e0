/// Skills Client: the single entry point for the external skills-classification API.
///
/// Callers depend on the `SkillExtractor` trait; `AppState` carries an
/// `Arc<dyn SkillExtractor>` so the HTTP backend can be swapped out in tests.
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum SkillsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extracts normalized skill names from free text.
#[async_trait]
pub trait SkillExtractor: Send + Sync {
    async fn extract(&self, text: &str, bearer_token: &str) -> Result<Vec<String>, SkillsError>;
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
}

#[derive(Clone)]
pub struct SkillsApiClient {
    client: Client,
    skills_url: String,
}

impl SkillsApiClient {
    pub fn new(skills_url: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            skills_url,
        }
    }
}

#[async_trait]
impl SkillExtractor for SkillsApiClient {
    /// One authenticated POST per document. No retries.
    async fn extract(&self, text: &str, bearer_token: &str) -> Result<Vec<String>, SkillsError> {
        let response = self
            .client
            .post(&self.skills_url)
            .bearer_auth(bearer_token)
            .json(&ExtractRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Failed to extract skills from document: {status} {body}");
            return Err(SkillsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)?;
        let skills = skill_names(&payload);

        debug!("Extracted {} skills from {} chars", skills.len(), text.len());

        Ok(skills)
    }
}

/// Collects `data[].skill.name` from a classification response, skipping
/// records that are malformed or carry an empty name.
pub fn skill_names(payload: &Value) -> Vec<String> {
    payload
        .get("data")
        .and_then(|v| v.as_array())
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r.get("skill").and_then(|s| s.get("name")))
                .filter_map(|n| n.as_str())
                .filter(|n| !n.trim().is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> SkillsApiClient {
        SkillsApiClient::new(
            format!("{}/skills/versions/latest/extract", server.url()),
            std::time::Duration::from_secs(5),
        )
    }

    #[test]
    fn test_skill_names_reads_nested_names() {
        let payload = json!({
            "data": [
                {"skill": {"id": "KS1", "name": "Python (Programming Language)"}, "confidence": 1.0},
                {"skill": {"id": "KS2", "name": "SQL (Programming Language)"}}
            ]
        });
        assert_eq!(
            skill_names(&payload),
            vec!["Python (Programming Language)", "SQL (Programming Language)"]
        );
    }

    #[test]
    fn test_skill_names_skips_malformed_records() {
        let payload = json!({
            "data": [
                "not an object",
                {"confidence": 0.9},
                {"skill": null},
                {"skill": {"id": "KS3"}},
                {"skill": {"name": ""}},
                {"skill": {"name": "   "}},
                {"skill": {"name": 42}},
                {"skill": {"name": "Rust"}}
            ]
        });
        assert_eq!(skill_names(&payload), vec!["Rust"]);
    }

    #[test]
    fn test_skill_names_without_data_is_empty() {
        assert!(skill_names(&json!({"attributions": []})).is_empty());
        assert!(skill_names(&json!({"data": {"skill": {"name": "Rust"}}})).is_empty());
    }

    #[tokio::test]
    async fn test_extract_posts_text_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/skills/versions/latest/extract")
            .match_header("authorization", "Bearer tok-1")
            .match_body(Matcher::Json(json!({"text": "We need Python and SQL"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [{"skill": {"name": "Python"}}, {"skill": {"name": "SQL"}}]}"#,
            )
            .create_async()
            .await;

        let skills = client_for(&server)
            .extract("We need Python and SQL", "tok-1")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(skills, vec!["Python", "SQL"]);
    }

    #[tokio::test]
    async fn test_extract_non_success_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/skills/versions/latest/extract")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = client_for(&server).extract("text", "tok").await.unwrap_err();
        assert!(matches!(err, SkillsError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_extract_invalid_json_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/skills/versions/latest/extract")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = client_for(&server).extract("text", "tok").await.unwrap_err();
        assert!(matches!(err, SkillsError::Parse(_)));
    }
}
