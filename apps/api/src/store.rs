use tokio::sync::RwLock;

use crate::models::job::{JobPosting, ResumeProfile};

/// In-memory repository for the uploaded job list and résumé.
/// Each upload replaces the previous value wholesale; readers get a snapshot.
#[derive(Default)]
pub struct MatchStore {
    jobs: RwLock<Option<Vec<JobPosting>>>,
    resume: RwLock<Option<ResumeProfile>>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of jobs now stored.
    pub async fn replace_jobs(&self, jobs: Vec<JobPosting>) -> usize {
        let count = jobs.len();
        *self.jobs.write().await = Some(jobs);
        count
    }

    pub async fn replace_resume(&self, resume: ResumeProfile) {
        *self.resume.write().await = Some(resume);
    }

    /// `None` until jobs have been uploaded at least once (an empty upload counts).
    pub async fn jobs(&self) -> Option<Vec<JobPosting>> {
        self.jobs.read().await.clone()
    }

    pub async fn resume(&self) -> Option<ResumeProfile> {
        self.resume.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> JobPosting {
        serde_json::from_value(serde_json::json!({ "positionName": name })).unwrap()
    }

    #[tokio::test]
    async fn test_store_starts_empty() {
        let store = MatchStore::new();
        assert!(store.jobs().await.is_none());
        assert!(store.resume().await.is_none());
    }

    #[tokio::test]
    async fn test_replace_jobs_does_not_merge() {
        let store = MatchStore::new();
        store.replace_jobs(vec![job("a"), job("b")]).await;
        let count = store.replace_jobs(vec![job("c")]).await;

        assert_eq!(count, 1);
        let jobs = store.jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].position_name, "c");
    }

    #[tokio::test]
    async fn test_empty_upload_still_counts_as_uploaded() {
        let store = MatchStore::new();
        store.replace_jobs(vec![]).await;
        assert_eq!(store.jobs().await, Some(vec![]));
    }

    #[tokio::test]
    async fn test_replace_resume_last_write_wins() {
        let store = MatchStore::new();
        store
            .replace_resume(ResumeProfile {
                skills: ["Java".to_string()].into_iter().collect(),
                source: "first".to_string(),
            })
            .await;
        store
            .replace_resume(ResumeProfile {
                skills: ["Rust".to_string()].into_iter().collect(),
                source: "second".to_string(),
            })
            .await;

        let resume = store.resume().await.unwrap();
        assert_eq!(resume.source, "second");
        assert!(resume.skills.contains("Rust"));
        assert!(!resume.skills.contains("Java"));
    }
}
