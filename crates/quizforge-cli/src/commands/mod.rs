pub mod capabilities;
pub mod evaluate;
pub mod grade;
pub mod init;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use quizforge_core::model::Quiz;
use quizforge_core::parser;

/// Load a single quiz file, or every quiz in a directory.
pub(crate) fn load_quizzes(path: &Path) -> Result<Vec<Quiz>> {
    if path.is_dir() {
        parser::load_quiz_directory(path)
    } else {
        Ok(vec![parser::parse_quiz(path)?])
    }
}
