//! Error types for evaluation and the attempt lifecycle.
//!
//! Authoring problems are never errors here: the validator collects them into
//! a [`crate::validator::ValidationReport`]. Only conditions that must stop a
//! computation are modelled as `Err` values.

use thiserror::Error;

use crate::attempt::AttemptState;

/// Fatal failures while grading an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The quiz snapshot references data that does not exist or cannot be
    /// graded. Nothing is scored when this happens.
    #[error("data integrity violation in question '{question_id}': {message}")]
    DataIntegrity { question_id: String, message: String },
}

impl EvaluationError {
    pub(crate) fn integrity(question_id: &str, message: impl Into<String>) -> Self {
        EvaluationError::DataIntegrity {
            question_id: question_id.to_string(),
            message: message.into(),
        }
    }

    /// The question the failure was detected in.
    pub fn question_id(&self) -> &str {
        match self {
            EvaluationError::DataIntegrity { question_id, .. } => question_id,
        }
    }
}

/// Illegal operations on an [`crate::attempt::Attempt`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The operation is not allowed from the attempt's current state.
    #[error("cannot {action} an attempt that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: AttemptState,
    },

    /// The attempt was scored against a different quiz than it was started for.
    #[error("attempt belongs to quiz '{expected}', got snapshot of '{actual}'")]
    QuizMismatch { expected: String, actual: String },

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
