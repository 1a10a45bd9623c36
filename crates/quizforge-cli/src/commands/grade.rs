//! The `quizforge grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use quizforge_core::batch::{BatchConfig, BatchGrader, ProgressReporter};
use quizforge_core::parser;
use quizforge_core::report::{GradedSubmission, GradingFailure, GradingReport};
use quizforge_core::traits::InMemoryQuizStore;

use crate::config::load_config_from;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_grade_start(&self, attempt_id: Uuid, quiz_id: &str) {
        tracing::debug!("grading {quiz_id} :: {attempt_id}");
    }

    fn on_grade_complete(&self, graded: &GradedSubmission) {
        eprintln!(
            "  Done: {} :: {} {}/{} ({}%)",
            graded.quiz_id,
            graded.user_id,
            graded.result.score,
            graded.result.max_score,
            graded.result.percentage,
        );
    }

    fn on_grade_error(&self, failure: &GradingFailure) {
        eprintln!(
            "  ERROR: {} :: {}: {}",
            failure.quiz_id, failure.user_id, failure.error
        );
    }

    fn on_batch_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    quizzes_path: PathBuf,
    submissions_path: PathBuf,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    let output = output.unwrap_or(config.output_dir);

    let quizzes = super::load_quizzes(&quizzes_path)?;
    let submissions = if submissions_path.is_dir() {
        parser::load_submission_directory(&submissions_path)?
    } else {
        vec![parser::parse_submission(&submissions_path)?]
    };

    eprintln!(
        "quizforge v{} - Grading {} submissions against {} quizzes",
        env!("CARGO_PKG_VERSION"),
        submissions.len(),
        quizzes.len()
    );
    eprintln!();

    let store = Arc::new(InMemoryQuizStore::with_quizzes(quizzes));
    let grader = BatchGrader::new(store, BatchConfig { parallelism });
    let report = grader.grade_all(submissions, &ConsoleReporter).await?;

    print_summary(&report);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output.join(format!("report-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(report: &GradingReport) {
    let mut table = Table::new();
    table.set_header(vec!["Quiz", "Played", "Average", "Pass rate", "Pending review"]);

    for stats in report.stats.per_quiz.values() {
        table.add_row(vec![
            Cell::new(&stats.quiz_id),
            Cell::new(stats.times_played),
            Cell::new(format!("{:.1}%", stats.average_percentage)),
            Cell::new(format!("{:.1}%", stats.pass_rate * 100.0)),
            Cell::new(stats.pending_manual_review),
        ]);
    }
    println!("{table}");

    let leaderboard = report.stats.leaderboard();
    if !leaderboard.is_empty() {
        let mut board = Table::new();
        board.set_header(vec!["Rank", "User", "Points"]);
        for entry in &leaderboard {
            board.add_row(vec![
                Cell::new(entry.rank),
                Cell::new(&entry.user_id),
                Cell::new(entry.total_points),
            ]);
        }
        println!("{board}");
    }

    println!(
        "{} graded, {} failed",
        report.submissions.len(),
        report.failures.len()
    );
}
