//! Batch grading orchestrator.
//!
//! Fetches quiz snapshots through a [`QuizSnapshotProvider`] and grades many
//! submissions concurrently, bounded by a semaphore. A submission that fails
//! (unknown quiz, corrupt snapshot, provider error) is recorded as a
//! [`GradingFailure`] and never affects the others.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::attempt::Submission;
use crate::engine::{evaluate_attempt, EvaluationResult};
use crate::model::Quiz;
use crate::report::{GradedSubmission, GradingFailure, GradingReport};
use crate::statistics::compute_aggregate_stats;
use crate::traits::{QuizSnapshotProvider, TierProvider};
use crate::validator::{validate_quiz, ValidationReport};

/// Configuration for the batch grader.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum submissions graded at once.
    pub parallelism: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_grade_start(&self, attempt_id: Uuid, quiz_id: &str);
    fn on_grade_complete(&self, graded: &GradedSubmission);
    fn on_grade_error(&self, failure: &GradingFailure);
    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_grade_start(&self, _: Uuid, _: &str) {}
    fn on_grade_complete(&self, _: &GradedSubmission) {}
    fn on_grade_error(&self, _: &GradingFailure) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grades submissions against published snapshots.
pub struct BatchGrader {
    snapshots: Arc<dyn QuizSnapshotProvider>,
    config: BatchConfig,
}

impl BatchGrader {
    pub fn new(snapshots: Arc<dyn QuizSnapshotProvider>, config: BatchConfig) -> Self {
        Self { snapshots, config }
    }

    /// Grade every submission and collect the results into a report.
    ///
    /// Submissions keep their input order in the report regardless of the
    /// order they finish in.
    pub async fn grade_all(
        &self,
        submissions: Vec<Submission>,
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        let report_id = Uuid::new_v4();
        let semaphore = Semaphore::new(self.config.parallelism.max(1));
        let total = submissions.len();

        let mut futures = FuturesUnordered::new();
        for (index, submission) in submissions.into_iter().enumerate() {
            let snapshots = Arc::clone(&self.snapshots);
            let semaphore = &semaphore;

            futures.push(async move {
                let outcome = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    progress.on_grade_start(submission.attempt_id, &submission.quiz_id);
                    grade_submission(snapshots.as_ref(), &submission).await
                }
                .await;
                (index, submission, outcome)
            });
        }

        let mut graded = Vec::new();
        let mut failures = Vec::new();

        while let Some((index, submission, outcome)) = futures.next().await {
            match outcome {
                Ok(result) => {
                    let entry = GradedSubmission {
                        attempt_id: submission.attempt_id,
                        quiz_id: submission.quiz_id,
                        user_id: submission.user_id,
                        result,
                    };
                    progress.on_grade_complete(&entry);
                    graded.push((index, entry));
                }
                Err(e) => {
                    tracing::error!(
                        "grading failed for {}/{}: {e:#}",
                        submission.quiz_id,
                        submission.user_id
                    );
                    let failure = GradingFailure {
                        attempt_id: submission.attempt_id,
                        quiz_id: submission.quiz_id,
                        user_id: submission.user_id,
                        error: format!("{e:#}"),
                    };
                    progress.on_grade_error(&failure);
                    failures.push((index, failure));
                }
            }
        }

        graded.sort_by_key(|(index, _)| *index);
        failures.sort_by_key(|(index, _)| *index);
        let submissions: Vec<GradedSubmission> = graded.into_iter().map(|(_, g)| g).collect();
        let failures: Vec<GradingFailure> = failures.into_iter().map(|(_, f)| f).collect();

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, submissions.len(), failures.len(), elapsed);

        let stats = compute_aggregate_stats(&submissions);

        Ok(GradingReport {
            id: report_id,
            created_at: chrono::Utc::now(),
            submissions,
            failures,
            stats,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Fetch the snapshot a submission belongs to and grade it.
pub async fn grade_submission(
    snapshots: &dyn QuizSnapshotProvider,
    submission: &Submission,
) -> Result<EvaluationResult> {
    let quiz: Quiz = snapshots
        .get_quiz(&submission.quiz_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("quiz '{}' not found", submission.quiz_id))?;

    let result = evaluate_attempt(&quiz, &submission.answers)?;
    Ok(result)
}

/// Validate a draft for `author_id` at their current tier.
pub async fn validate_draft(
    tiers: &dyn TierProvider,
    author_id: &str,
    draft: &Quiz,
) -> Result<ValidationReport> {
    let tier = tiers.tier_for(author_id).await?;
    Ok(validate_quiz(draft, tier))
}
