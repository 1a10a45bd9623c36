//! Grading report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::EvaluationResult;
use crate::statistics::AggregateStats;

/// One submission that was graded successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedSubmission {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub user_id: String,
    pub result: EvaluationResult,
}

/// One submission that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingFailure {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub user_id: String,
    pub error: String,
}

/// A complete grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub submissions: Vec<GradedSubmission>,
    #[serde(default)]
    pub failures: Vec<GradingFailure>,
    pub stats: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl GradingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Returns true if any submission failed to grade.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} graded, {} failed, {} pending manual review\n\n",
            self.submissions.len(),
            self.failures.len(),
            self.submissions
                .iter()
                .map(|s| s.result.pending_manual_review)
                .sum::<u32>()
        ));

        if !self.submissions.is_empty() {
            md.push_str("### Submissions\n\n");
            md.push_str("| Quiz | User | Score | Percentage | Points | Passed |\n");
            md.push_str("|------|------|-------|------------|--------|--------|\n");
            for s in &self.submissions {
                md.push_str(&format!(
                    "| {} | {} | {}/{} | {}% | {} | {} |\n",
                    s.quiz_id,
                    s.user_id,
                    s.result.score,
                    s.result.max_score,
                    s.result.percentage,
                    s.result.points_earned,
                    if s.result.passed { "yes" } else { "no" }
                ));
            }
            md.push('\n');
        }

        if !self.stats.per_quiz.is_empty() {
            md.push_str("### Quizzes\n\n");
            md.push_str("| Quiz | Played | Average | Pass rate |\n");
            md.push_str("|------|--------|---------|-----------|\n");
            for q in self.stats.per_quiz.values() {
                md.push_str(&format!(
                    "| {} | {} | {:.1}% | {:.1}% |\n",
                    q.quiz_id,
                    q.times_played,
                    q.average_percentage,
                    q.pass_rate * 100.0
                ));
            }
            md.push('\n');
        }

        if !self.failures.is_empty() {
            md.push_str("### Failures\n\n");
            md.push_str("| Quiz | User | Error |\n");
            md.push_str("|------|------|-------|\n");
            for f in &self.failures {
                md.push_str(&format!("| {} | {} | {} |\n", f.quiz_id, f.user_id, f.error));
            }
        }

        md
    }
}
