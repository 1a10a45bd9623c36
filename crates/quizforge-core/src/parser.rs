//! TOML quiz and submission parser.
//!
//! Parsing is lenient about content: missing text fields become empty values
//! so that [`crate::validator::validate_quiz`] can report them all at once.
//! Only syntax errors and unknown enum values fail here.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::attempt::{Answer, AnswerValue, Submission};
use crate::model::{
    Blank, Difficulty, MatchingPair, Question, QuestionKind, QuestionOption, QuestionType, Quiz,
    QuizCategory, Visibility,
};

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    time_limit_minutes: Option<u32>,
    #[serde(default = "default_pass_threshold")]
    pass_threshold: u8,
    #[serde(default)]
    visibility: Option<String>,
}

fn default_pass_threshold() -> u8 {
    crate::model::default_pass_threshold()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    question_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    time_limit_secs: Option<u32>,
    #[serde(default)]
    options: Vec<TomlOption>,
    #[serde(default)]
    correct: Vec<String>,
    /// Shorthand for true/false questions without explicit options.
    #[serde(default)]
    answer: Option<bool>,
    #[serde(default)]
    pairs: Vec<TomlPair>,
    #[serde(default)]
    template: String,
    #[serde(default)]
    blanks: Vec<TomlBlank>,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    acceptable_answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TomlPair {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    left: String,
    #[serde(default)]
    right: String,
}

#[derive(Debug, Deserialize)]
struct TomlBlank {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    acceptable_answers: Vec<String>,
}

/// Intermediate TOML structure for submission files.
#[derive(Debug, Deserialize)]
struct TomlSubmissionFile {
    submission: TomlSubmissionHeader,
    #[serde(default)]
    answers: Vec<TomlAnswer>,
}

#[derive(Debug, Deserialize)]
struct TomlSubmissionHeader {
    #[serde(default)]
    attempt_id: Option<String>,
    quiz_id: String,
    user_id: String,
    /// RFC 3339 timestamp.
    #[serde(default)]
    started_at: Option<String>,
    #[serde(default)]
    submitted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    question_id: String,
    #[serde(default)]
    selected: Option<Vec<String>>,
    #[serde(default)]
    matches: Option<BTreeMap<String, String>>,
    #[serde(default)]
    blanks: Option<BTreeMap<String, String>>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    elapsed_secs: Option<u32>,
}

/// Parse a single quiz file.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a quiz from a TOML string.
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.quiz;
    let category: QuizCategory = header
        .category
        .map(|c| c.parse::<QuizCategory>().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()?
        .unwrap_or_else(crate::model::default_category);
    let difficulty: Difficulty = header
        .difficulty
        .map(|d| d.parse::<Difficulty>().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()?
        .unwrap_or_else(crate::model::default_difficulty);
    let visibility: Visibility = header
        .visibility
        .map(|v| v.parse::<Visibility>().map_err(|e: String| anyhow::anyhow!("{}", e)))
        .transpose()?
        .unwrap_or_else(crate::model::default_visibility);

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| convert_question(index, q))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid question in {}", source_path.display()))?;

    Ok(Quiz {
        id: header.id,
        title: header.title,
        description: header.description,
        category,
        difficulty,
        time_limit_minutes: header.time_limit_minutes,
        pass_threshold: header.pass_threshold,
        visibility,
        questions,
    })
}

fn convert_question(index: usize, q: TomlQuestion) -> Result<Question> {
    let id = q.id.unwrap_or_else(|| format!("q{}", index + 1));
    let question_type: QuestionType = q
        .question_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!("question '{}': {}", id, e))?;

    let options: Vec<QuestionOption> = q
        .options
        .into_iter()
        .map(|o| QuestionOption {
            id: o.id,
            text: o.text,
        })
        .collect();
    let correct_option_ids: BTreeSet<String> = q.correct.into_iter().collect();

    let explicit_options = !options.is_empty() || !correct_option_ids.is_empty();

    let kind = match question_type {
        QuestionType::MultipleChoice => QuestionKind::MultipleChoice {
            options,
            correct_option_ids,
        },
        QuestionType::TrueFalse => match (explicit_options, q.answer) {
            (true, Some(_)) => anyhow::bail!(
                "question '{}' sets both answer and options/correct; use one or the other",
                id
            ),
            (false, Some(answer)) => QuestionKind::TrueFalse {
                options: vec![
                    QuestionOption {
                        id: "true".into(),
                        text: "True".into(),
                    },
                    QuestionOption {
                        id: "false".into(),
                        text: "False".into(),
                    },
                ],
                correct_option_ids: [answer.to_string()].into(),
            },
            _ => QuestionKind::TrueFalse {
                options,
                correct_option_ids,
            },
        },
        QuestionType::Matching => QuestionKind::Matching {
            pairs: q
                .pairs
                .into_iter()
                .enumerate()
                .map(|(i, p)| MatchingPair {
                    id: p.id.unwrap_or_else(|| format!("p{}", i + 1)),
                    left: p.left,
                    right: p.right,
                })
                .collect(),
        },
        QuestionType::FillInBlank => QuestionKind::FillInBlank {
            template: q.template,
            blanks: q
                .blanks
                .into_iter()
                .enumerate()
                .map(|(i, b)| Blank {
                    id: b.id.unwrap_or_else(|| format!("b{}", i + 1)),
                    correct_answer: b.correct_answer,
                    acceptable_answers: b.acceptable_answers,
                })
                .collect(),
        },
        QuestionType::ShortAnswer => QuestionKind::ShortAnswer {
            correct_answer: q.correct_answer,
            acceptable_answers: q.acceptable_answers,
        },
        QuestionType::Essay => QuestionKind::Essay,
    };

    Ok(Question {
        id,
        text: q.text,
        image_url: q.image_url,
        time_limit_secs: q.time_limit_secs,
        kind,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for path in toml_files(dir)? {
        match parse_quiz(&path) {
            Ok(quiz) => quizzes.push(quiz),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(quizzes)
}

/// Parse a single submission file.
pub fn parse_submission(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;

    parse_submission_str(&content, path)
}

/// Parse a submission from a TOML string.
pub fn parse_submission_str(content: &str, source_path: &Path) -> Result<Submission> {
    let parsed: TomlSubmissionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let header = parsed.submission;
    let attempt_id = match header.attempt_id {
        Some(id) => Uuid::parse_str(&id).with_context(|| format!("invalid attempt_id: {id}"))?,
        None => Uuid::new_v4(),
    };

    let answers = parsed
        .answers
        .into_iter()
        .map(convert_answer)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid answer in {}", source_path.display()))?;

    Ok(Submission {
        attempt_id,
        quiz_id: header.quiz_id,
        user_id: header.user_id,
        started_at: header.started_at.as_deref().map(parse_timestamp).transpose()?,
        submitted_at: header
            .submitted_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
        answers,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid RFC 3339 timestamp: {raw}"))
}

fn convert_answer(a: TomlAnswer) -> Result<Answer> {
    let mut values = Vec::new();
    if let Some(option_ids) = a.selected {
        values.push(AnswerValue::Selection { option_ids });
    }
    if let Some(matches) = a.matches {
        values.push(AnswerValue::Matching { matches });
    }
    if let Some(entries) = a.blanks {
        values.push(AnswerValue::Blanks { entries });
    }
    if let Some(text) = a.text {
        values.push(AnswerValue::Text { text });
    }

    if values.len() > 1 {
        anyhow::bail!(
            "answer for '{}' sets more than one of selected, matches, blanks, text",
            a.question_id
        );
    }

    Ok(Answer {
        question_id: a.question_id,
        value: values.pop(),
        elapsed_secs: a.elapsed_secs,
    })
}

/// Recursively load all `.toml` submission files from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_submission_directory(dir: &Path) -> Result<Vec<Submission>> {
    let mut submissions = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for path in toml_files(dir)? {
        match parse_submission(&path) {
            Ok(submission) => submissions.push(submission),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}

/// All `.toml` files under `dir`, recursively, in sorted order.
fn toml_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();

        if path.is_dir() {
            files.extend(toml_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
