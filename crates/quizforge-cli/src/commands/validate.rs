//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::validator::validate_quiz;

use crate::config::load_config_from;

pub fn execute(quiz_path: PathBuf, tier: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let tier = config.resolve_tier(tier.as_deref())?;
    let quizzes = super::load_quizzes(&quiz_path)?;

    println!("Validating as {} tier", tier);

    let mut total_errors = 0;

    for quiz in &quizzes {
        println!("Quiz: {} ({} questions)", quiz.title, quiz.questions.len());

        let report = validate_quiz(quiz, tier);
        for issue in &report.errors {
            println!("  {issue}");
        }
        total_errors += report.errors.len();
    }

    if total_errors == 0 {
        println!("All quizzes valid.");
        Ok(())
    } else {
        println!("\n{total_errors} problem(s) found.");
        anyhow::bail!("{total_errors} validation problem(s) in {}", quiz_path.display())
    }
}
