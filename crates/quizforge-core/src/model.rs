//! Core data model types for quizforge.
//!
//! A [`Quiz`] is an ordered list of [`Question`]s plus metadata. Each question
//! carries one of six variant payloads in [`QuestionKind`]; the variant decides
//! both its structural rules (checked here by [`Question::shape_errors`]) and
//! how the engine grades it.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marker that denotes a blank inside a fill-in-the-blank template.
pub const BLANK_MARKER: &str = "{{blank}}";

/// The six question types a quiz may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Matching,
    FillInBlank,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Every question type, in declaration order.
    pub const ALL: [QuestionType; 6] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::Matching,
        QuestionType::FillInBlank,
        QuestionType::ShortAnswer,
        QuestionType::Essay,
    ];

    /// Whether correctness can be computed without human judgment.
    pub fn is_auto_gradable(self) -> bool {
        !matches!(self, QuestionType::Essay)
    }

    /// Human-readable label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::TrueFalse => "True/False",
            QuestionType::Matching => "Matching",
            QuestionType::FillInBlank => "Fill in the Blank",
            QuestionType::ShortAnswer => "Short Answer",
            QuestionType::Essay => "Essay",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionType::MultipleChoice => "MultipleChoice",
            QuestionType::TrueFalse => "TrueFalse",
            QuestionType::Matching => "Matching",
            QuestionType::FillInBlank => "FillInBlank",
            QuestionType::ShortAnswer => "ShortAnswer",
            QuestionType::Essay => "Essay",
        };
        write!(f, "{name}")
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "multiplechoice" | "mc" => Ok(QuestionType::MultipleChoice),
            "truefalse" | "tf" | "bool" => Ok(QuestionType::TrueFalse),
            "matching" => Ok(QuestionType::Matching),
            "fillinblank" | "fillintheblank" => Ok(QuestionType::FillInBlank),
            "shortanswer" => Ok(QuestionType::ShortAnswer),
            "essay" => Ok(QuestionType::Essay),
            _ => Err(format!("unknown question type: {s}")),
        }
    }
}

/// A selectable option of a multiple-choice or true/false question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// One left/right pair of a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub id: String,
    pub left: String,
    pub right: String,
}

/// One blank of a fill-in-the-blank question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blank {
    pub id: String,
    pub correct_answer: String,
    /// Alternative spellings accepted as correct.
    #[serde(default)]
    pub acceptable_answers: Vec<String>,
}

/// Variant-specific payload of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<QuestionOption>,
        correct_option_ids: BTreeSet<String>,
    },
    TrueFalse {
        options: Vec<QuestionOption>,
        correct_option_ids: BTreeSet<String>,
    },
    Matching {
        pairs: Vec<MatchingPair>,
    },
    FillInBlank {
        /// Text with one [`BLANK_MARKER`] per blank.
        template: String,
        blanks: Vec<Blank>,
    },
    ShortAnswer {
        correct_answer: String,
        #[serde(default)]
        acceptable_answers: Vec<String>,
    },
    Essay,
}

/// A single question of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    /// The prompt shown to the quiz taker.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Per-question time limit in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u32>,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// A structural problem with a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeError {
    /// Dotted path of the offending field, e.g. `options[2].text`.
    pub field: String,
    pub message: String,
}

impl ShapeError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Count the blank markers in a fill-in-the-blank template.
pub fn count_blank_markers(template: &str) -> usize {
    template.matches(BLANK_MARKER).count()
}

impl Question {
    /// The type tag of this question.
    pub fn question_type(&self) -> QuestionType {
        match &self.kind {
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::TrueFalse { .. } => QuestionType::TrueFalse,
            QuestionKind::Matching { .. } => QuestionType::Matching,
            QuestionKind::FillInBlank { .. } => QuestionType::FillInBlank,
            QuestionKind::ShortAnswer { .. } => QuestionType::ShortAnswer,
            QuestionKind::Essay => QuestionType::Essay,
        }
    }

    /// Check that the question is well-formed for its declared type.
    ///
    /// Returns every problem found; an empty list means the question is
    /// valid. Subscription tier is not considered here.
    pub fn shape_errors(&self) -> Vec<ShapeError> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push(ShapeError::new("id", "question id is required"));
        }
        if self.text.trim().is_empty() {
            errors.push(ShapeError::new("text", "question text is required"));
        }
        if self.time_limit_secs == Some(0) {
            errors.push(ShapeError::new(
                "time_limit_secs",
                "time limit must be greater than zero",
            ));
        }

        match &self.kind {
            QuestionKind::MultipleChoice {
                options,
                correct_option_ids,
            } => {
                if options.len() < 2 {
                    errors.push(ShapeError::new(
                        "options",
                        "multiple choice questions need at least 2 options",
                    ));
                }
                check_options(options, correct_option_ids, &mut errors);
                if correct_option_ids.is_empty() {
                    errors.push(ShapeError::new(
                        "correct_option_ids",
                        "at least one option must be marked correct",
                    ));
                }
            }
            QuestionKind::TrueFalse {
                options,
                correct_option_ids,
            } => {
                if options.len() != 2 {
                    errors.push(ShapeError::new(
                        "options",
                        format!(
                            "true/false questions need exactly 2 options, found {}",
                            options.len()
                        ),
                    ));
                }
                check_options(options, correct_option_ids, &mut errors);
                if correct_option_ids.len() != 1 {
                    errors.push(ShapeError::new(
                        "correct_option_ids",
                        format!(
                            "true/false questions need exactly 1 correct option, found {}",
                            correct_option_ids.len()
                        ),
                    ));
                }
            }
            QuestionKind::Matching { pairs } => {
                if pairs.len() < 2 {
                    errors.push(ShapeError::new(
                        "pairs",
                        "matching questions need at least 2 pairs",
                    ));
                }
                for (i, pair) in pairs.iter().enumerate() {
                    if pair.left.trim().is_empty() {
                        errors.push(ShapeError::new(
                            format!("pairs[{i}].left"),
                            "matching pair left side cannot be empty",
                        ));
                    }
                    if pair.right.trim().is_empty() {
                        errors.push(ShapeError::new(
                            format!("pairs[{i}].right"),
                            "matching pair right side cannot be empty",
                        ));
                    }
                }
            }
            QuestionKind::FillInBlank { template, blanks } => {
                if template.trim().is_empty() {
                    errors.push(ShapeError::new(
                        "template",
                        "fill-in-the-blank text is required",
                    ));
                }
                if blanks.is_empty() {
                    errors.push(ShapeError::new("blanks", "at least one blank is required"));
                }
                let markers = count_blank_markers(template);
                if markers != blanks.len() {
                    errors.push(ShapeError::new(
                        "blanks",
                        format!(
                            "template has {markers} {BLANK_MARKER} marker(s) but {} blank(s) are defined",
                            blanks.len()
                        ),
                    ));
                }
                for (i, blank) in blanks.iter().enumerate() {
                    if blank.correct_answer.trim().is_empty() {
                        errors.push(ShapeError::new(
                            format!("blanks[{i}].correct_answer"),
                            "every blank needs a correct answer",
                        ));
                    }
                }
            }
            QuestionKind::ShortAnswer { correct_answer, .. } => {
                if correct_answer.trim().is_empty() {
                    errors.push(ShapeError::new(
                        "correct_answer",
                        "short answer questions need a correct answer",
                    ));
                }
            }
            QuestionKind::Essay => {}
        }

        errors
    }
}

fn check_options(
    options: &[QuestionOption],
    correct_option_ids: &BTreeSet<String>,
    errors: &mut Vec<ShapeError>,
) {
    let mut seen = HashSet::new();
    for (i, option) in options.iter().enumerate() {
        if option.id.trim().is_empty() {
            errors.push(ShapeError::new(
                format!("options[{i}].id"),
                "option id is required",
            ));
        } else if !seen.insert(option.id.as_str()) {
            errors.push(ShapeError::new(
                format!("options[{i}].id"),
                format!("duplicate option id: {}", option.id),
            ));
        }
        if option.text.trim().is_empty() {
            errors.push(ShapeError::new(
                format!("options[{i}].text"),
                "option text cannot be empty",
            ));
        }
    }

    for id in correct_option_ids {
        if !seen.contains(id.as_str()) {
            errors.push(ShapeError::new(
                "correct_option_ids",
                format!("correct option '{id}' does not name an option"),
            ));
        }
    }
}

/// Quiz subject area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizCategory {
    #[serde(rename = "General Knowledge")]
    GeneralKnowledge,
    Science,
    History,
    Geography,
    Entertainment,
    Sports,
    Technology,
    Mathematics,
    Language,
    Art,
    Other,
}

impl fmt::Display for QuizCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizCategory::GeneralKnowledge => "General Knowledge",
            QuizCategory::Science => "Science",
            QuizCategory::History => "History",
            QuizCategory::Geography => "Geography",
            QuizCategory::Entertainment => "Entertainment",
            QuizCategory::Sports => "Sports",
            QuizCategory::Technology => "Technology",
            QuizCategory::Mathematics => "Mathematics",
            QuizCategory::Language => "Language",
            QuizCategory::Art => "Art",
            QuizCategory::Other => "Other",
        };
        write!(f, "{name}")
    }
}

impl FromStr for QuizCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general knowledge" | "general" => Ok(QuizCategory::GeneralKnowledge),
            "science" => Ok(QuizCategory::Science),
            "history" => Ok(QuizCategory::History),
            "geography" => Ok(QuizCategory::Geography),
            "entertainment" => Ok(QuizCategory::Entertainment),
            "sports" => Ok(QuizCategory::Sports),
            "technology" => Ok(QuizCategory::Technology),
            "mathematics" | "math" => Ok(QuizCategory::Mathematics),
            "language" => Ok(QuizCategory::Language),
            "art" => Ok(QuizCategory::Art),
            "other" => Ok(QuizCategory::Other),
            other => Err(format!("unknown quiz category: {other}")),
        }
    }
}

/// Quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Who may find and take a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Friends,
    Community,
    Subscribers,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Friends => write!(f, "friends"),
            Visibility::Community => write!(f, "community"),
            Visibility::Subscribers => write!(f, "subscribers"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "friends" => Ok(Visibility::Friends),
            "community" => Ok(Visibility::Community),
            "subscribers" => Ok(Visibility::Subscribers),
            other => Err(format!("unknown visibility: {other}")),
        }
    }
}

/// A quiz: a draft while authored, a snapshot once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: QuizCategory,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    /// Whole-quiz time limit in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<u32>,
    /// Minimum percentage needed to pass.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,
    #[serde(default = "default_visibility")]
    pub visibility: Visibility,
    #[serde(default)]
    pub questions: Vec<Question>,
}

pub(crate) fn default_category() -> QuizCategory {
    QuizCategory::Other
}

pub(crate) fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

pub(crate) fn default_pass_threshold() -> u8 {
    70
}

pub(crate) fn default_visibility() -> Visibility {
    Visibility::Public
}

impl Quiz {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions that can be graded automatically.
    pub fn auto_gradable_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type().is_auto_gradable())
            .count()
    }
}
