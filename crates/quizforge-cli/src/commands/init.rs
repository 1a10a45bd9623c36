//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizforge.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("quizzes")?;
    write_if_missing(Path::new("quizzes/example.toml"), EXAMPLE_QUIZ)?;

    std::fs::create_dir_all("submissions")?;
    write_if_missing(Path::new("submissions/example.toml"), EXAMPLE_SUBMISSION)?;

    println!("\nNext steps:");
    println!("  1. Edit quizforge.toml to set your default tier");
    println!("  2. Run: quizforge validate --quiz quizzes/example.toml");
    println!("  3. Run: quizforge grade --quizzes quizzes --submissions submissions");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

# Tier assumed for authors when --tier is not given (free, pro, premium, admin).
# QUIZFORGE_TIER overrides this value.
default_tier = "free"
parallelism = 4
output_dir = "./quizforge-results"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example quiz"
description = "A starter quiz that every tier can publish"
category = "General Knowledge"
difficulty = "easy"
pass_threshold = 70

[[questions]]
id = "planets"
type = "MultipleChoice"
text = "Which of these are planets?"
options = [
    { id = "mars", text = "Mars" },
    { id = "moon", text = "The Moon" },
    { id = "venus", text = "Venus" },
]
correct = ["mars", "venus"]

[[questions]]
id = "water"
type = "TrueFalse"
text = "Water boils at 100 degrees Celsius at sea level."
answer = true
"#;

const EXAMPLE_SUBMISSION: &str = r#"[submission]
quiz_id = "example"
user_id = "demo"

[[answers]]
question_id = "planets"
selected = ["venus", "mars"]
elapsed_secs = 14

[[answers]]
question_id = "water"
selected = ["true"]
elapsed_secs = 5
"#;
