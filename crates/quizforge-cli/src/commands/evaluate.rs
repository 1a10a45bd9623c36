//! The `quizforge evaluate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizforge_core::engine::{evaluate_attempt, EvaluationResult, GradeDetail, Outcome};
use quizforge_core::parser;

pub fn execute(quiz_path: PathBuf, submission_path: PathBuf, format: String) -> Result<()> {
    let quiz = parser::parse_quiz(&quiz_path)?;
    let submission = parser::parse_submission(&submission_path)?;

    anyhow::ensure!(
        submission.quiz_id == quiz.id,
        "submission is for quiz '{}', but {} contains quiz '{}'",
        submission.quiz_id,
        quiz_path.display(),
        quiz.id
    );

    let result = evaluate_attempt(&quiz, &submission.answers)
        .with_context(|| format!("failed to grade {}", submission_path.display()))?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&quiz.title, &submission.user_id, &result),
    }

    Ok(())
}

fn print_text(title: &str, user_id: &str, result: &EvaluationResult) {
    println!("Quiz: {title} ({})", result.quiz_id);
    println!("User: {user_id}");

    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Outcome", "Detail"]);
    for q in &result.per_question {
        let outcome = match q.outcome {
            Outcome::Correct => "correct",
            Outcome::Incorrect if !q.answered => "unanswered",
            Outcome::Incorrect => "incorrect",
            Outcome::Pending => "pending review",
        };
        let detail = match &q.detail {
            Some(d @ GradeDetail::Matching { .. }) => {
                let (matched, total) = d.matched_parts();
                format!("{matched}/{total} pairs")
            }
            Some(d @ GradeDetail::Blanks { .. }) => {
                let (matched, total) = d.matched_parts();
                format!("{matched}/{total} blanks")
            }
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(&q.question_id),
            Cell::new(q.question_type.label()),
            Cell::new(outcome),
            Cell::new(detail),
        ]);
    }
    println!("{table}");

    println!(
        "Score: {}/{} ({}%) - {}",
        result.score,
        result.max_score,
        result.percentage,
        if result.passed { "passed" } else { "failed" }
    );
    println!("Points earned: {}", result.points_earned);
    if result.pending_manual_review > 0 {
        println!("Pending manual review: {}", result.pending_manual_review);
    }
    if result.time_taken_secs > 0 {
        println!("Time taken: {}s", result.time_taken_secs);
    }
    for skipped in &result.skipped_answers {
        println!("Skipped answer for '{}': {}", skipped.question_id, skipped.reason);
    }
}
