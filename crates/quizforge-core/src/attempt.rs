//! Answers, submissions, and the attempt lifecycle.
//!
//! An [`Attempt`] moves strictly forward through
//! `Created → InProgress → Submitted → Scored`. Retrying a quiz means starting
//! a new attempt; there is no transition back to `InProgress`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{evaluate_attempt, EvaluationResult};
use crate::error::AttemptError;
use crate::model::Quiz;

/// The submitted value for one question. Which shape is expected depends on
/// the question's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerValue {
    /// Selected option ids (multiple choice, true/false).
    Selection { option_ids: Vec<String> },
    /// Left text → chosen right text (matching).
    Matching { matches: BTreeMap<String, String> },
    /// Blank id → typed text (fill in the blank).
    Blanks { entries: BTreeMap<String, String> },
    /// Free text (short answer, essay).
    Text { text: String },
}

/// One answer within an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    /// `None` when the question was left unanswered.
    #[serde(default)]
    pub value: Option<AnswerValue>,
    /// Seconds spent on the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<u32>,
}

impl Answer {
    pub fn unanswered(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            value: None,
            elapsed_secs: None,
        }
    }

    pub fn selection<I, S>(question_id: impl Into<String>, option_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_value(
            question_id,
            AnswerValue::Selection {
                option_ids: option_ids.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn matching<I, K, V>(question_id: impl Into<String>, matches: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_value(
            question_id,
            AnswerValue::Matching {
                matches: matches
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
        )
    }

    pub fn blanks<I, K, V>(question_id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_value(
            question_id,
            AnswerValue::Blanks {
                entries: entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            },
        )
    }

    pub fn text(question_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_value(question_id, AnswerValue::Text { text: text.into() })
    }

    fn with_value(question_id: impl Into<String>, value: AnswerValue) -> Self {
        Self {
            question_id: question_id.into(),
            value: Some(value),
            elapsed_secs: None,
        }
    }

    /// Attach the time spent on the question.
    pub fn elapsed(mut self, secs: u32) -> Self {
        self.elapsed_secs = Some(secs);
        self
    }
}

/// The frozen answers of a submitted attempt, as handed to grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Submission {
    /// Wall-clock seconds between start and submission, when both are known.
    pub fn wall_clock_secs(&self) -> Option<i64> {
        match (self.started_at, self.submitted_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds().max(0)),
            _ => None,
        }
    }
}

/// Lifecycle state of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Created,
    InProgress,
    Submitted,
    Scored,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptState::Created => write!(f, "created"),
            AttemptState::InProgress => write!(f, "in progress"),
            AttemptState::Submitted => write!(f, "submitted"),
            AttemptState::Scored => write!(f, "scored"),
        }
    }
}

/// One user's pass through a published quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    id: Uuid,
    quiz_id: String,
    user_id: String,
    state: AttemptState,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
    answers: Vec<Answer>,
    result: Option<EvaluationResult>,
}

impl Attempt {
    /// Create an attempt and record its start time.
    pub fn new(quiz_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.into(),
            user_id: user_id.into(),
            state: AttemptState::Created,
            started_at: Utc::now(),
            submitted_at: None,
            answers: Vec::new(),
            result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// The evaluation, once the attempt is scored.
    pub fn result(&self) -> Option<&EvaluationResult> {
        self.result.as_ref()
    }

    /// Move from `Created` to `InProgress`.
    pub fn begin(&mut self) -> Result<(), AttemptError> {
        match self.state {
            AttemptState::Created => {
                self.state = AttemptState::InProgress;
                Ok(())
            }
            state => Err(AttemptError::InvalidTransition {
                action: "begin",
                state,
            }),
        }
    }

    /// Record (or replace) the answer for one question.
    ///
    /// A `Created` attempt begins implicitly on its first answer.
    pub fn record_answer(&mut self, answer: Answer) -> Result<(), AttemptError> {
        match self.state {
            AttemptState::Created => self.begin()?,
            AttemptState::InProgress => {}
            state => {
                return Err(AttemptError::InvalidTransition {
                    action: "record an answer on",
                    state,
                })
            }
        }

        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
        Ok(())
    }

    /// Freeze the answers and move to `Submitted`.
    pub fn submit(&mut self) -> Result<Submission, AttemptError> {
        if self.state != AttemptState::InProgress {
            return Err(AttemptError::InvalidTransition {
                action: "submit",
                state: self.state,
            });
        }
        self.state = AttemptState::Submitted;
        self.submitted_at = Some(Utc::now());
        tracing::debug!(
            attempt = %self.id,
            quiz = %self.quiz_id,
            answers = self.answers.len(),
            "attempt submitted"
        );
        Ok(self.to_submission())
    }

    /// Grade the submitted answers against `quiz` and move to `Scored`.
    ///
    /// Runs the engine exactly once. On a data integrity failure the attempt
    /// stays `Submitted` and nothing is recorded.
    pub fn score(&mut self, quiz: &Quiz) -> Result<&EvaluationResult, AttemptError> {
        if self.state != AttemptState::Submitted {
            return Err(AttemptError::InvalidTransition {
                action: "score",
                state: self.state,
            });
        }
        if quiz.id != self.quiz_id {
            return Err(AttemptError::QuizMismatch {
                expected: self.quiz_id.clone(),
                actual: quiz.id.clone(),
            });
        }

        let result = evaluate_attempt(quiz, &self.answers)?;
        self.state = AttemptState::Scored;
        Ok(&*self.result.insert(result))
    }

    /// The frozen submission, available once submitted.
    pub fn submission(&self) -> Option<Submission> {
        matches!(
            self.state,
            AttemptState::Submitted | AttemptState::Scored
        )
        .then(|| self.to_submission())
    }

    fn to_submission(&self) -> Submission {
        Submission {
            attempt_id: self.id,
            quiz_id: self.quiz_id.clone(),
            user_id: self.user_id.clone(),
            started_at: Some(self.started_at),
            submitted_at: self.submitted_at,
            answers: self.answers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionKind, QuestionOption, Question};

    fn quiz() -> Quiz {
        Quiz {
            id: "colors".into(),
            title: "Colors".into(),
            description: "Basic colors".into(),
            category: crate::model::QuizCategory::Art,
            difficulty: crate::model::Difficulty::Easy,
            time_limit_minutes: None,
            pass_threshold: 70,
            visibility: crate::model::Visibility::Public,
            questions: vec![Question {
                id: "q1".into(),
                text: "Sky color?".into(),
                image_url: None,
                time_limit_secs: None,
                kind: QuestionKind::MultipleChoice {
                    options: vec![
                        QuestionOption {
                            id: "a".into(),
                            text: "Blue".into(),
                        },
                        QuestionOption {
                            id: "b".into(),
                            text: "Green".into(),
                        },
                    ],
                    correct_option_ids: ["a".to_string()].into(),
                },
            }],
        }
    }

    #[test]
    fn full_lifecycle() {
        let mut attempt = Attempt::new("colors", "alice");
        assert_eq!(attempt.state(), AttemptState::Created);

        attempt.record_answer(Answer::selection("q1", ["b"]).elapsed(4)).unwrap();
        assert_eq!(attempt.state(), AttemptState::InProgress);

        attempt.record_answer(Answer::selection("q1", ["a"]).elapsed(7)).unwrap();
        assert_eq!(attempt.answers().len(), 1, "later answer replaces earlier");

        let submission = attempt.submit().unwrap();
        assert_eq!(attempt.state(), AttemptState::Submitted);
        assert_eq!(submission.answers[0].elapsed_secs, Some(7));
        assert!(submission.submitted_at.is_some());

        let result = attempt.score(&quiz()).unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(attempt.state(), AttemptState::Scored);
        assert!(attempt.result().is_some());
    }

    #[test]
    fn submitted_attempt_is_frozen() {
        let mut attempt = Attempt::new("colors", "alice");
        attempt.begin().unwrap();
        attempt.submit().unwrap();

        let err = attempt
            .record_answer(Answer::selection("q1", ["a"]))
            .unwrap_err();
        assert!(matches!(
            err,
            AttemptError::InvalidTransition {
                state: AttemptState::Submitted,
                ..
            }
        ));
        assert!(attempt.submit().is_err());
        assert!(attempt.begin().is_err());
    }

    #[test]
    fn cannot_submit_before_starting() {
        let mut attempt = Attempt::new("colors", "alice");
        assert!(attempt.submit().is_err());
        assert!(attempt.submission().is_none());
    }

    #[test]
    fn scoring_happens_once() {
        let mut attempt = Attempt::new("colors", "alice");
        attempt.record_answer(Answer::selection("q1", ["a"])).unwrap();
        attempt.submit().unwrap();
        attempt.score(&quiz()).unwrap();

        let err = attempt.score(&quiz()).unwrap_err();
        assert!(matches!(
            err,
            AttemptError::InvalidTransition {
                state: AttemptState::Scored,
                ..
            }
        ));
    }

    #[test]
    fn scoring_rejects_other_quiz() {
        let mut attempt = Attempt::new("shapes", "alice");
        attempt.begin().unwrap();
        attempt.submit().unwrap();
        let err = attempt.score(&quiz()).unwrap_err();
        assert!(matches!(err, AttemptError::QuizMismatch { .. }));
        assert_eq!(attempt.state(), AttemptState::Submitted);
    }

    #[test]
    fn corrupted_snapshot_leaves_attempt_submitted() {
        let mut broken = quiz();
        if let QuestionKind::MultipleChoice {
            correct_option_ids, ..
        } = &mut broken.questions[0].kind
        {
            *correct_option_ids = ["missing".to_string()].into();
        }

        let mut attempt = Attempt::new("colors", "alice");
        attempt.record_answer(Answer::selection("q1", ["a"])).unwrap();
        attempt.submit().unwrap();

        let err = attempt.score(&broken).unwrap_err();
        assert!(matches!(err, AttemptError::Evaluation(_)));
        assert_eq!(attempt.state(), AttemptState::Submitted);
        assert!(attempt.result().is_none());
    }

    #[test]
    fn answer_value_serde_shape() {
        let answer = Answer::blanks("q2", [("b1", "Paris")]);
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["value"]["kind"], "blanks");
        assert_eq!(json["value"]["entries"]["b1"], "Paris");
    }
}
