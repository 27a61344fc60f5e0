//! Scorer: skill-set overlap between each job and the résumé.
//!
//! matched = job ∩ résumé, missing = job − matched,
//! score   = round(100 × |job ∩ résumé| / |job ∪ résumé|), 0 when both are empty.

use std::collections::BTreeSet;

use crate::matching::dispatcher::AnnotatedJob;
use crate::models::job::{JobMatch, JobPosting};

/// |a ∩ b| / |a ∪ b|, defined as 0 when the union is empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Jaccard similarity as a rounded integer percentage in 0..=100.
pub fn match_score<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> u8 {
    (jaccard(a, b) * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn score_job(job: &JobPosting, job_skills: &[String], resume: &BTreeSet<String>) -> JobMatch {
    let job_set: BTreeSet<String> = job_skills.iter().cloned().collect();
    let matched: Vec<String> = job_set.intersection(resume).cloned().collect();
    let missing: Vec<String> = job_set.difference(resume).cloned().collect();

    JobMatch {
        id: job.id.clone(),
        position_name: job.position_name.clone(),
        company: job.company.clone(),
        match_score: match_score(&job_set, resume),
        matched_skills: matched,
        missing_skills: missing,
        url: job.apply_url(),
        posted_at: job.posted_at.clone(),
        description: job.description.clone(),
        location: job.location.clone(),
        salary: job.salary.clone(),
        job_type: job.job_type.clone(),
    }
}

/// Scores every annotated job and sorts by score, highest first.
/// The sort is stable: ties keep their collection order.
pub fn rank_matches(annotated: &[AnnotatedJob], resume: &BTreeSet<String>) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = annotated
        .iter()
        .map(|a| score_job(&a.job, &a.skills, resume))
        .collect();
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches
}
