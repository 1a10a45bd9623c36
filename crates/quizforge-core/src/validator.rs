//! Authoring validation of quiz drafts.
//!
//! [`validate_quiz`] checks a draft against its structural rules and the
//! author's [`SubscriptionTier`]. It never fails and never stops early: every
//! problem found ends up in the returned [`ValidationReport`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::{capabilities_for, minimum_tier_for, upgrade_message, SubscriptionTier};
use crate::model::{Quiz, Visibility};

/// Category of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The draft is malformed regardless of who authors it.
    Structural,
    /// The draft uses something the author's tier does not include.
    TierRestriction,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Structural => write!(f, "structural"),
            IssueKind::TierRestriction => write!(f, "tier"),
        }
    }
}

/// A single problem found in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Zero-based position of the offending question, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    fn quiz(kind: IssueKind, field: &str, message: impl Into<String>) -> Self {
        Self {
            question_index: None,
            field: Some(field.to_string()),
            kind,
            message: message.into(),
        }
    }

    fn question(
        index: usize,
        kind: IssueKind,
        field: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            question_index: Some(index),
            field,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        match (self.question_index, &self.field) {
            (Some(i), Some(field)) => write!(f, "question {}, {field}: ", i + 1)?,
            (Some(i), None) => write!(f, "question {}: ", i + 1)?,
            (None, Some(field)) => write!(f, "{field}: ")?,
            (None, None) => {}
        }
        write!(f, "{}", self.message)
    }
}

/// Outcome of validating a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Issues of one kind.
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Issues attached to the question at `index`.
    pub fn for_question(&self, index: usize) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .filter(move |e| e.question_index == Some(index))
    }
}

/// Validate `draft` for an author on `tier`.
pub fn validate_quiz(draft: &Quiz, tier: SubscriptionTier) -> ValidationReport {
    let caps = capabilities_for(tier);
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push(ValidationIssue::quiz(
            IssueKind::Structural,
            "title",
            "quiz title is required",
        ));
    }
    if draft.description.trim().is_empty() {
        errors.push(ValidationIssue::quiz(
            IssueKind::Structural,
            "description",
            "quiz description is required",
        ));
    }
    if draft.questions.is_empty() {
        errors.push(ValidationIssue::quiz(
            IssueKind::Structural,
            "questions",
            "quiz must contain at least one question",
        ));
    }
    if draft.pass_threshold > 100 {
        errors.push(ValidationIssue::quiz(
            IssueKind::Structural,
            "pass_threshold",
            format!(
                "pass threshold must be between 0 and 100, got {}",
                draft.pass_threshold
            ),
        ));
    }
    if draft.time_limit_minutes == Some(0) {
        errors.push(ValidationIssue::quiz(
            IssueKind::Structural,
            "time_limit_minutes",
            "time limit must be greater than zero",
        ));
    }

    if !caps.permits_question_count(draft.questions.len()) {
        let max = caps.max_questions_per_quiz.unwrap_or_default();
        errors.push(ValidationIssue::quiz(
            IssueKind::TierRestriction,
            "questions",
            format!(
                "{} plan allows at most {max} questions per quiz, found {}",
                tier.plan_name(),
                draft.questions.len()
            ),
        ));
    }

    if draft.visibility == Visibility::Subscribers && !caps.can_share_beyond_followers {
        errors.push(ValidationIssue::quiz(
            IssueKind::TierRestriction,
            "visibility",
            upgrade_message("Subscriber-only quizzes", SubscriptionTier::Pro),
        ));
    }

    let mut seen_ids = HashSet::new();
    for (index, question) in draft.questions.iter().enumerate() {
        let question_type = question.question_type();

        if !caps.allows(question_type) {
            errors.push(ValidationIssue::question(
                index,
                IssueKind::TierRestriction,
                Some("type".into()),
                format!(
                    "question '{}': {}",
                    question.id,
                    upgrade_message(
                        &format!("{} questions", question_type.label()),
                        minimum_tier_for(question_type),
                    )
                ),
            ));
        }

        if !question.id.trim().is_empty() && !seen_ids.insert(question.id.as_str()) {
            errors.push(ValidationIssue::question(
                index,
                IssueKind::Structural,
                Some("id".into()),
                format!("duplicate question id: {}", question.id),
            ));
        }

        for shape in question.shape_errors() {
            errors.push(ValidationIssue::question(
                index,
                IssueKind::Structural,
                Some(shape.field),
                shape.message,
            ));
        }
    }

    tracing::debug!(
        quiz = %draft.id,
        %tier,
        errors = errors.len(),
        "draft validated"
    );

    ValidationReport::from_errors(errors)
}
