//! Concurrent Dispatcher: one skill-extraction call per job, at most K in
//! flight where K is the number of bearer tokens.
//!
//! Job `i` is statically assigned `tokens[i mod K]`. Results come back in
//! completion order. A job whose call fails, times out or panics is logged
//! and left out of the result.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::models::job::JobPosting;
use crate::oauth::pool::round_robin;
use crate::skills_client::{SkillExtractor, SkillsError};

/// A job together with the skills extracted from its description.
#[derive(Debug, Clone)]
pub struct AnnotatedJob {
    pub job: JobPosting,
    pub skills: Vec<String>,
}

#[derive(Debug)]
pub struct DispatchOutcome {
    pub annotated: Vec<AnnotatedJob>,
    /// Jobs that produced no result and were left out.
    pub dropped: usize,
}

enum CallOutcome {
    Done(Result<Vec<String>, SkillsError>),
    TimedOut,
}

pub async fn annotate_jobs(
    jobs: Vec<JobPosting>,
    tokens: &[String],
    extractor: Arc<dyn SkillExtractor>,
    call_timeout: Duration,
) -> DispatchOutcome {
    let total = jobs.len();
    if tokens.is_empty() {
        error!("No bearer tokens available, cannot dispatch {total} jobs");
        return DispatchOutcome {
            annotated: Vec::new(),
            dropped: total,
        };
    }

    let workers = Arc::new(Semaphore::new(tokens.len()));
    let mut tasks = JoinSet::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let Some(token) = round_robin(tokens, index).cloned() else {
            continue;
        };
        let extractor = Arc::clone(&extractor);
        let workers = Arc::clone(&workers);

        tasks.spawn(async move {
            // The semaphore is never closed, so a permit is always granted.
            let _permit = workers.acquire_owned().await.ok();
            let outcome = match tokio::time::timeout(
                call_timeout,
                extractor.extract(&job.description, &token),
            )
            .await
            {
                Ok(result) => CallOutcome::Done(result),
                Err(_) => CallOutcome::TimedOut,
            };
            (job, outcome)
        });
    }

    let mut annotated = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((job, CallOutcome::Done(Ok(skills)))) => {
                debug!(
                    "Extracted {} skills for job: {}",
                    skills.len(),
                    job.position_name
                );
                annotated.push(AnnotatedJob { job, skills });
            }
            Ok((job, CallOutcome::Done(Err(e)))) => {
                error!("Failed to extract skills for job: {} - {e}", job.position_name);
            }
            Ok((job, CallOutcome::TimedOut)) => {
                warn!(
                    "Skill extraction timed out after {}s for job: {}",
                    call_timeout.as_secs(),
                    job.position_name
                );
            }
            Err(e) => error!("Error processing job: {e}"),
        }
    }

    let dropped = total - annotated.len();
    DispatchOutcome { annotated, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records which token each description was classified with and how many
    /// calls overlapped. Descriptions containing "fail" return an API error,
    /// "hang" never completes and "panic" panics.
    #[derive(Default)]
    struct RecordingExtractor {
        calls: Mutex<HashMap<String, String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl SkillExtractor for RecordingExtractor {
        async fn extract(&self, text: &str, bearer_token: &str) -> Result<Vec<String>, SkillsError> {
            self.calls
                .lock()
                .unwrap()
                .insert(text.to_string(), bearer_token.to_string());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text.contains("hang") {
                std::future::pending::<()>().await;
            }
            if text.contains("panic") {
                panic!("extractor blew up");
            }
            if text.contains("fail") {
                return Err(SkillsError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(text.split_whitespace().map(String::from).collect())
        }
    }

    fn job(description: &str) -> JobPosting {
        serde_json::from_value(serde_json::json!({
            "positionName": description,
            "description": description
        }))
        .unwrap()
    }

    fn tokens(k: usize) -> Vec<String> {
        (0..k).map(|i| format!("token-{i}")).collect()
    }

    #[tokio::test]
    async fn test_failed_job_is_dropped_not_zero_scored() {
        let extractor = Arc::new(RecordingExtractor::default());
        let outcome = annotate_jobs(
            vec![job("Python SQL"), job("fail here"), job("Rust Tokio")],
            &tokens(2),
            extractor,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(outcome.annotated.len(), 2);
        assert_eq!(outcome.dropped, 1);
        assert!(outcome
            .annotated
            .iter()
            .all(|a| a.job.description != "fail here"));
    }

    #[tokio::test]
    async fn test_jobs_use_round_robin_tokens_by_input_index() {
        let extractor = Arc::new(RecordingExtractor::default());
        let jobs: Vec<JobPosting> = (0..7).map(|i| job(&format!("job-{i}"))).collect();

        annotate_jobs(jobs, &tokens(3), extractor.clone(), Duration::from_secs(5)).await;

        let calls = extractor.calls.lock().unwrap();
        for i in 0..7 {
            assert_eq!(calls[&format!("job-{i}")], format!("token-{}", i % 3));
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_token_count() {
        let extractor = Arc::new(RecordingExtractor::default());
        let jobs: Vec<JobPosting> = (0..12).map(|i| job(&format!("job-{i}"))).collect();

        let outcome =
            annotate_jobs(jobs, &tokens(3), extractor.clone(), Duration::from_secs(5)).await;

        assert_eq!(outcome.annotated.len(), 12);
        let max = extractor.max_in_flight.load(Ordering::SeqCst);
        assert!(max >= 1 && max <= 3, "max in flight was {max}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_is_cut_off_by_timeout() {
        let extractor = Arc::new(RecordingExtractor::default());
        let outcome = annotate_jobs(
            vec![job("hang forever"), job("Python")],
            &tokens(2),
            extractor,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcome.annotated.len(), 1);
        assert_eq!(outcome.annotated[0].job.description, "Python");
        assert_eq!(outcome.dropped, 1);
    }

    #[tokio::test]
    async fn test_panicking_task_does_not_abort_batch() {
        let extractor = Arc::new(RecordingExtractor::default());
        let outcome = annotate_jobs(
            vec![job("panic now"), job("Go"), job("Java")],
            &tokens(1),
            extractor,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(outcome.annotated.len(), 2);
        assert_eq!(outcome.dropped, 1);
    }

    #[tokio::test]
    async fn test_no_tokens_dispatches_nothing() {
        let extractor = Arc::new(RecordingExtractor::default());
        let outcome =
            annotate_jobs(vec![job("Python")], &[], extractor.clone(), Duration::from_secs(5))
                .await;

        assert!(outcome.annotated.is_empty());
        assert_eq!(outcome.dropped, 1);
        assert!(extractor.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_job_list_is_empty_outcome() {
        let extractor = Arc::new(RecordingExtractor::default());
        let outcome =
            annotate_jobs(Vec::new(), &tokens(2), extractor, Duration::from_secs(5)).await;
        assert!(outcome.annotated.is_empty());
        assert_eq!(outcome.dropped, 0);
    }
}
