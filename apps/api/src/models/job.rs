use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A job posting as loaded from the jobs directory (scraped listing format).
/// Missing or null text fields default to empty; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default = "new_job_id", deserialize_with = "id_or_new")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub position_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub external_apply_link: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub posted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

fn id_or_new<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(new_job_id))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl JobPosting {
    /// The link a candidate should follow: the external apply link when set,
    /// otherwise the listing URL, otherwise empty.
    pub fn apply_url(&self) -> String {
        [&self.external_apply_link, &self.url]
            .into_iter()
            .flatten()
            .find(|u| !u.trim().is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// Skills extracted from the most recently uploaded résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResumeProfile {
    pub skills: BTreeSet<String>,
    pub source: String,
}

/// One ranked result of matching a job against the résumé. Derived per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub id: String,
    pub position_name: String,
    pub company: String,
    pub match_score: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub url: String,
    pub posted_at: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}
