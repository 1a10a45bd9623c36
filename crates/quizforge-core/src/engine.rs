//! Answer evaluation engine.
//!
//! [`evaluate_attempt`] grades a frozen batch of answers against a published
//! quiz snapshot. Each question type has its own comparison rule; essays are
//! never auto-graded and are reported as pending manual review instead of
//! counting toward the score.
//!
//! A snapshot that is internally inconsistent aborts the whole evaluation
//! with [`EvaluationError::DataIntegrity`]: no partial score is produced.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::attempt::{Answer, AnswerValue};
use crate::error::EvaluationError;
use crate::model::{
    count_blank_markers, Blank, MatchingPair, Question, QuestionKind, QuestionOption, QuestionType,
    Quiz,
};

/// Percentage bands and the points they award, highest first. Lower bounds
/// are inclusive.
pub const POINTS_BANDS: [(u8, u32); 4] = [(90, 50), (80, 40), (70, 30), (60, 20)];

/// Points awarded below the lowest band.
pub const BASE_POINTS: u32 = 10;

/// Points earned for a given percentage.
pub fn points_for_percentage(percentage: u8) -> u32 {
    POINTS_BANDS
        .iter()
        .find(|(floor, _)| percentage >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(BASE_POINTS)
}

/// `round(100 * score / max_score)`, with halves rounded up.
///
/// A quiz with nothing to auto-grade (0 of 0) counts as 100%.
pub fn percentage(score: u32, max_score: u32) -> u8 {
    if max_score == 0 {
        return 100;
    }
    let score = u64::from(score.min(max_score));
    let max = u64::from(max_score);
    ((200 * score + max) / (2 * max)) as u8
}

/// Grading outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Needs a human grader; excluded from the automatic score.
    Pending,
}

/// Per-pair result of a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairResult {
    pub pair_id: String,
    pub left: String,
    pub expected: String,
    pub submitted: Option<String>,
    pub matched: bool,
}

/// Per-blank result of a fill-in-the-blank question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankResult {
    pub blank_id: String,
    pub submitted: Option<String>,
    pub matched: bool,
}

/// Breakdown shown alongside questions with several parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradeDetail {
    Matching { pairs: Vec<PairResult> },
    Blanks { blanks: Vec<BlankResult> },
}

impl GradeDetail {
    /// `(matched parts, total parts)`.
    pub fn matched_parts(&self) -> (usize, usize) {
        match self {
            GradeDetail::Matching { pairs } => {
                (pairs.iter().filter(|p| p.matched).count(), pairs.len())
            }
            GradeDetail::Blanks { blanks } => {
                (blanks.iter().filter(|b| b.matched).count(), blanks.len())
            }
        }
    }
}

/// Result for one question of the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question_id: String,
    pub question_type: QuestionType,
    pub outcome: Outcome,
    /// Whether any value was submitted for the question.
    pub answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<GradeDetail>,
}

/// An answer that was ignored because it does not belong to the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAnswer {
    pub question_id: String,
    pub reason: String,
}

/// Outcome of grading one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub quiz_id: String,
    /// Auto-gradable questions judged correct.
    pub score: u32,
    /// Auto-gradable questions in the quiz.
    pub max_score: u32,
    pub percentage: u8,
    pub points_earned: u32,
    /// Whether `percentage` reaches the quiz's pass threshold.
    pub passed: bool,
    /// Essay questions awaiting a human grader.
    pub pending_manual_review: u32,
    /// Sum of the per-answer elapsed times.
    pub time_taken_secs: u32,
    pub per_question: Vec<QuestionEvaluation>,
    #[serde(default)]
    pub skipped_answers: Vec<SkippedAnswer>,
}

impl EvaluationResult {
    pub fn question(&self, question_id: &str) -> Option<&QuestionEvaluation> {
        self.per_question
            .iter()
            .find(|q| q.question_id == question_id)
    }

    pub fn outcome_of(&self, question_id: &str) -> Option<Outcome> {
        self.question(question_id).map(|q| q.outcome)
    }
}

/// Grade `answers` against the published `quiz` snapshot.
///
/// Missing or empty answers grade as incorrect. Answers naming a question
/// the snapshot does not contain are skipped and listed in
/// [`EvaluationResult::skipped_answers`]. When several answers target the same
/// question, the last one wins.
pub fn evaluate_attempt(
    quiz: &Quiz,
    answers: &[Answer],
) -> Result<EvaluationResult, EvaluationError> {
    check_snapshot(quiz)?;

    let known: HashSet<&str> = quiz.questions.iter().map(|q| q.id.as_str()).collect();
    let mut by_question: HashMap<&str, &Answer> = HashMap::new();
    let mut skipped_answers = Vec::new();

    for answer in answers {
        if known.contains(answer.question_id.as_str()) {
            by_question.insert(answer.question_id.as_str(), answer);
        } else {
            tracing::warn!(
                quiz = %quiz.id,
                question = %answer.question_id,
                "skipping answer for question not in snapshot"
            );
            skipped_answers.push(SkippedAnswer {
                question_id: answer.question_id.clone(),
                reason: "question is not part of this quiz".into(),
            });
        }
    }

    let mut score = 0u32;
    let mut max_score = 0u32;
    let mut pending_manual_review = 0u32;
    let mut time_taken_secs = 0u32;
    let mut per_question = Vec::with_capacity(quiz.questions.len());

    for question in &quiz.questions {
        let answer = by_question.get(question.id.as_str()).copied();
        let value = answer.and_then(|a| a.value.as_ref());
        let elapsed_secs = answer.and_then(|a| a.elapsed_secs);
        let (outcome, detail) = grade_question(question, value);

        match outcome {
            Outcome::Correct => {
                score += 1;
                max_score += 1;
            }
            Outcome::Incorrect => max_score += 1,
            Outcome::Pending => pending_manual_review += 1,
        }
        if let Some(secs) = elapsed_secs {
            time_taken_secs = time_taken_secs.saturating_add(secs);
        }

        per_question.push(QuestionEvaluation {
            question_id: question.id.clone(),
            question_type: question.question_type(),
            outcome,
            answered: value.is_some(),
            elapsed_secs,
            detail,
        });
    }

    let percentage = percentage(score, max_score);
    let points_earned = points_for_percentage(percentage);

    tracing::debug!(
        quiz = %quiz.id,
        score,
        max_score,
        percentage,
        points_earned,
        pending_manual_review,
        "attempt evaluated"
    );

    Ok(EvaluationResult {
        quiz_id: quiz.id.clone(),
        score,
        max_score,
        percentage,
        points_earned,
        passed: percentage >= quiz.pass_threshold,
        pending_manual_review,
        time_taken_secs,
        per_question,
        skipped_answers,
    })
}

fn grade_question(
    question: &Question,
    value: Option<&AnswerValue>,
) -> (Outcome, Option<GradeDetail>) {
    match &question.kind {
        QuestionKind::MultipleChoice {
            correct_option_ids, ..
        }
        | QuestionKind::TrueFalse {
            correct_option_ids, ..
        } => (outcome(grade_selection(correct_option_ids, value)), None),
        QuestionKind::Matching { pairs } => {
            let (correct, results) = grade_matching(pairs, value);
            (
                outcome(correct),
                Some(GradeDetail::Matching { pairs: results }),
            )
        }
        QuestionKind::FillInBlank { blanks, .. } => {
            let (correct, results) = grade_blanks(blanks, value);
            (
                outcome(correct),
                Some(GradeDetail::Blanks { blanks: results }),
            )
        }
        QuestionKind::ShortAnswer {
            correct_answer,
            acceptable_answers,
        } => {
            let correct = match value {
                Some(AnswerValue::Text { text }) => {
                    accepts(correct_answer, acceptable_answers, text)
                }
                _ => false,
            };
            (outcome(correct), None)
        }
        QuestionKind::Essay => (Outcome::Pending, None),
    }
}

fn outcome(correct: bool) -> Outcome {
    if correct {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}

/// Exact set equality between selected and correct option ids.
fn grade_selection(correct: &BTreeSet<String>, value: Option<&AnswerValue>) -> bool {
    let Some(AnswerValue::Selection { option_ids }) = value else {
        return false;
    };
    let selected: BTreeSet<&str> = option_ids.iter().map(String::as_str).collect();
    let expected: BTreeSet<&str> = correct.iter().map(String::as_str).collect();
    selected == expected
}

/// All-or-nothing across pairs, keyed by each pair's left text.
fn grade_matching(pairs: &[MatchingPair], value: Option<&AnswerValue>) -> (bool, Vec<PairResult>) {
    let matches = match value {
        Some(AnswerValue::Matching { matches }) => Some(matches),
        _ => None,
    };

    let results: Vec<PairResult> = pairs
        .iter()
        .map(|pair| {
            let submitted = matches.and_then(|m| m.get(&pair.left)).cloned();
            let matched = submitted.as_deref() == Some(pair.right.as_str());
            PairResult {
                pair_id: pair.id.clone(),
                left: pair.left.clone(),
                expected: pair.right.clone(),
                submitted,
                matched,
            }
        })
        .collect();

    let correct = !results.is_empty() && results.iter().all(|r| r.matched);
    (correct, results)
}

fn grade_blanks(blanks: &[Blank], value: Option<&AnswerValue>) -> (bool, Vec<BlankResult>) {
    let entries = match value {
        Some(AnswerValue::Blanks { entries }) => Some(entries),
        _ => None,
    };

    let results: Vec<BlankResult> = blanks
        .iter()
        .map(|blank| {
            let submitted = entries.and_then(|e| e.get(&blank.id)).cloned();
            let matched = submitted.as_deref().is_some_and(|text| {
                accepts(&blank.correct_answer, &blank.acceptable_answers, text)
            });
            BlankResult {
                blank_id: blank.id.clone(),
                submitted,
                matched,
            }
        })
        .collect();

    let correct = !results.is_empty() && results.iter().all(|r| r.matched);
    (correct, results)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Trimmed, case-insensitive match against the answer or an alternate.
fn accepts(correct: &str, alternates: &[String], submitted: &str) -> bool {
    let submitted = normalize(submitted);
    if submitted.is_empty() {
        return false;
    }
    std::iter::once(correct)
        .chain(alternates.iter().map(String::as_str))
        .any(|candidate| normalize(candidate) == submitted)
}

/// Reject snapshots that cannot be trusted for grading.
fn check_snapshot(quiz: &Quiz) -> Result<(), EvaluationError> {
    let mut question_ids = HashSet::new();

    for question in &quiz.questions {
        if !question_ids.insert(question.id.as_str()) {
            return Err(EvaluationError::integrity(
                &question.id,
                "question id appears more than once in the snapshot",
            ));
        }

        match &question.kind {
            QuestionKind::MultipleChoice {
                options,
                correct_option_ids,
            } => check_correct_options(&question.id, options, correct_option_ids)?,
            QuestionKind::TrueFalse {
                options,
                correct_option_ids,
            } => {
                check_correct_options(&question.id, options, correct_option_ids)?;
                if options.len() != 2 || correct_option_ids.len() != 1 {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        format!(
                            "true/false question has {} option(s) and {} correct, expected 2 and 1",
                            options.len(),
                            correct_option_ids.len()
                        ),
                    ));
                }
            }
            QuestionKind::Matching { pairs } => {
                if pairs.is_empty() {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        "matching question has no pairs",
                    ));
                }
                let mut lefts = HashSet::new();
                if let Some(dup) = pairs.iter().find(|p| !lefts.insert(p.left.as_str())) {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        format!("matching key '{}' is used by more than one pair", dup.left),
                    ));
                }
            }
            QuestionKind::FillInBlank { template, blanks } => {
                if blanks.is_empty() {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        "fill-in-the-blank question has no blanks",
                    ));
                }
                let markers = count_blank_markers(template);
                if markers != blanks.len() {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        format!(
                            "template has {markers} blank marker(s) but {} blank(s) are defined",
                            blanks.len()
                        ),
                    ));
                }
                let mut ids = HashSet::new();
                if let Some(dup) = blanks.iter().find(|b| !ids.insert(b.id.as_str())) {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        format!("blank id '{}' is used more than once", dup.id),
                    ));
                }
                if let Some(empty) = blanks
                    .iter()
                    .find(|b| !has_accepted_answer(&b.correct_answer, &b.acceptable_answers))
                {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        format!("blank '{}' has no accepted answer", empty.id),
                    ));
                }
            }
            QuestionKind::ShortAnswer {
                correct_answer,
                acceptable_answers,
            } => {
                if !has_accepted_answer(correct_answer, acceptable_answers) {
                    return Err(EvaluationError::integrity(
                        &question.id,
                        "no accepted answer is defined",
                    ));
                }
            }
            QuestionKind::Essay => {}
        }
    }

    Ok(())
}

fn check_correct_options(
    question_id: &str,
    options: &[QuestionOption],
    correct_option_ids: &BTreeSet<String>,
) -> Result<(), EvaluationError> {
    if correct_option_ids.is_empty() {
        return Err(EvaluationError::integrity(
            question_id,
            "no correct option is defined",
        ));
    }
    let option_ids: HashSet<&str> = options.iter().map(|o| o.id.as_str()).collect();
    if let Some(missing) = correct_option_ids
        .iter()
        .find(|id| !option_ids.contains(id.as_str()))
    {
        return Err(EvaluationError::integrity(
            question_id,
            format!("correct option '{missing}' does not exist"),
        ));
    }
    Ok(())
}

fn has_accepted_answer(correct: &str, alternates: &[String]) -> bool {
    std::iter::once(correct)
        .chain(alternates.iter().map(String::as_str))
        .any(|a| !a.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, QuizCategory, Visibility};

    fn quiz(questions: Vec<Question>) -> Quiz {
        Quiz {
            id: "quiz-1".into(),
            title: "Test quiz".into(),
            description: "For tests".into(),
            category: QuizCategory::GeneralKnowledge,
            difficulty: Difficulty::Medium,
            time_limit_minutes: None,
            pass_threshold: 70,
            visibility: Visibility::Public,
            questions,
        }
    }

    fn question(id: &str, kind: QuestionKind) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            image_url: None,
            time_limit_secs: None,
            kind,
        }
    }

    fn multiple_choice(id: &str, correct: &[&str]) -> Question {
        question(
            id,
            QuestionKind::MultipleChoice {
                options: ["a", "b", "c", "d"]
                    .iter()
                    .map(|o| QuestionOption {
                        id: o.to_string(),
                        text: format!("Option {o}"),
                    })
                    .collect(),
                correct_option_ids: correct.iter().map(|c| c.to_string()).collect(),
            },
        )
    }

    fn matching(id: &str) -> Question {
        question(
            id,
            QuestionKind::Matching {
                pairs: vec![
                    MatchingPair {
                        id: "p1".into(),
                        left: "France".into(),
                        right: "Paris".into(),
                    },
                    MatchingPair {
                        id: "p2".into(),
                        left: "Italy".into(),
                        right: "Rome".into(),
                    },
                ],
            },
        )
    }

    fn fill_in_blank(id: &str) -> Question {
        question(
            id,
            QuestionKind::FillInBlank {
                template: "The capital of France is {{blank}}.".into(),
                blanks: vec![Blank {
                    id: "b1".into(),
                    correct_answer: "Paris".into(),
                    acceptable_answers: vec!["paris".into(), "PARIS ".into()],
                }],
            },
        )
    }

    fn short_answer(id: &str) -> Question {
        question(
            id,
            QuestionKind::ShortAnswer {
                correct_answer: "H2O".into(),
                acceptable_answers: vec!["h2o".into()],
            },
        )
    }

    fn essay(id: &str) -> Question {
        question(id, QuestionKind::Essay)
    }

    #[test]
    fn selection_uses_set_equality() {
        let q = quiz(vec![multiple_choice("q1", &["a", "c"])]);

        for selection in [vec!["a", "c"], vec!["c", "a"], vec!["c", "a", "a"]] {
            let result = evaluate_attempt(&q, &[Answer::selection("q1", selection.clone())]).unwrap();
            assert_eq!(
                result.outcome_of("q1"),
                Some(Outcome::Correct),
                "{selection:?} should be correct"
            );
        }

        for selection in [vec!["a"], vec!["a", "c", "d"], vec![]] {
            let result = evaluate_attempt(&q, &[Answer::selection("q1", selection.clone())]).unwrap();
            assert_eq!(
                result.outcome_of("q1"),
                Some(Outcome::Incorrect),
                "{selection:?} should be incorrect"
            );
        }
    }

    #[test]
    fn fill_in_blank_trims_and_folds_case() {
        let q = quiz(vec![fill_in_blank("q1")]);
        let result = evaluate_attempt(&q, &[Answer::blanks("q1", [("b1", "  paris")])]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Correct));

        let detail = result.question("q1").unwrap().detail.as_ref().unwrap();
        assert_eq!(detail.matched_parts(), (1, 1));
    }

    #[test]
    fn fill_in_blank_requires_every_blank() {
        let mut q = fill_in_blank("q1");
        if let QuestionKind::FillInBlank { template, blanks } = &mut q.kind {
            template.push_str(" It lies on the {{blank}}.");
            blanks.push(Blank {
                id: "b2".into(),
                correct_answer: "Seine".into(),
                acceptable_answers: vec![],
            });
        }
        let q = quiz(vec![q]);
        let result = evaluate_attempt(
            &q,
            &[Answer::blanks("q1", [("b1", "Paris"), ("b2", "Loire")])],
        )
        .unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Incorrect));
        let detail = result.question("q1").unwrap().detail.as_ref().unwrap();
        assert_eq!(detail.matched_parts(), (1, 2));
    }

    #[test]
    fn short_answer_is_case_insensitive() {
        let q = quiz(vec![short_answer("q1")]);
        let result = evaluate_attempt(&q, &[Answer::text("q1", "H2o")]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Correct));

        let result = evaluate_attempt(&q, &[Answer::text("q1", "   ")]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Incorrect));
    }

    #[test]
    fn matching_is_all_or_nothing_with_breakdown() {
        let q = quiz(vec![matching("q1")]);
        let result = evaluate_attempt(
            &q,
            &[Answer::matching("q1", [("France", "Paris"), ("Italy", "Madrid")])],
        )
        .unwrap();

        let eval = result.question("q1").unwrap();
        assert_eq!(eval.outcome, Outcome::Incorrect);
        assert_eq!(eval.detail.as_ref().unwrap().matched_parts(), (1, 2));
        assert_eq!(result.score, 0);

        let result = evaluate_attempt(
            &q,
            &[Answer::matching("q1", [("France", "Paris"), ("Italy", "Rome")])],
        )
        .unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Correct));
    }

    #[test]
    fn essays_are_pending_and_excluded_from_score() {
        let q = quiz(vec![
            multiple_choice("q1", &["a"]),
            multiple_choice("q2", &["b"]),
            multiple_choice("q3", &["c", "d"]),
            essay("q4"),
        ]);
        let answers = vec![
            Answer::selection("q1", ["a"]),
            Answer::selection("q2", ["b"]),
            Answer::selection("q3", ["d", "c"]),
            Answer::text("q4", "A long reflection."),
        ];

        let result = evaluate_attempt(&q, &answers).unwrap();
        assert_eq!(result.score, 3);
        assert_eq!(result.max_score, 3);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.pending_manual_review, 1);
        assert_eq!(result.points_earned, 50);
        assert_eq!(result.outcome_of("q4"), Some(Outcome::Pending));
    }

    #[test]
    fn all_essay_quiz_is_full_marks() {
        let q = quiz(vec![essay("q1"), essay("q2")]);
        let result = evaluate_attempt(&q, &[]).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.max_score, 0);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.pending_manual_review, 2);
        assert!(result.passed);
    }

    #[test]
    fn points_bands() {
        assert_eq!(points_for_percentage(100), 50);
        assert_eq!(points_for_percentage(90), 50);
        assert_eq!(points_for_percentage(89), 40);
        assert_eq!(points_for_percentage(80), 40);
        assert_eq!(points_for_percentage(70), 30);
        assert_eq!(points_for_percentage(60), 20);
        assert_eq!(points_for_percentage(59), 10);
        assert_eq!(points_for_percentage(0), 10);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(0, 0), 100);
    }

    #[test]
    fn missing_answers_are_incorrect() {
        let q = quiz(vec![
            multiple_choice("q1", &["a"]),
            short_answer("q2"),
            matching("q3"),
        ]);
        let result = evaluate_attempt(&q, &[Answer::unanswered("q1")]).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.max_score, 3);
        assert_eq!(result.points_earned, 10);
        assert!(!result.passed);
        assert!(result.per_question.iter().all(|q| !q.answered));
    }

    #[test]
    fn wrong_answer_shape_is_incorrect() {
        let q = quiz(vec![multiple_choice("q1", &["a"])]);
        let result = evaluate_attempt(&q, &[Answer::text("q1", "a")]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Incorrect));
    }

    #[test]
    fn unknown_question_answers_are_skipped() {
        let q = quiz(vec![multiple_choice("q1", &["a"])]);
        let result = evaluate_attempt(
            &q,
            &[Answer::selection("ghost", ["a"]), Answer::selection("q1", ["a"])],
        )
        .unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.skipped_answers.len(), 1);
        assert_eq!(result.skipped_answers[0].question_id, "ghost");
    }

    #[test]
    fn last_answer_for_a_question_wins() {
        let q = quiz(vec![multiple_choice("q1", &["a"])]);
        let result = evaluate_attempt(
            &q,
            &[Answer::selection("q1", ["b"]), Answer::selection("q1", ["a"]).elapsed(9)],
        )
        .unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Correct));
        assert_eq!(result.time_taken_secs, 9);
    }

    #[test]
    fn dangling_correct_option_aborts_evaluation() {
        let q = quiz(vec![
            multiple_choice("q1", &["a"]),
            multiple_choice("q2", &["zzz"]),
        ]);
        let err = evaluate_attempt(&q, &[Answer::selection("q1", ["a"])]).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::DataIntegrity {
                question_id: "q2".into(),
                message: "correct option 'zzz' does not exist".into(),
            }
        );
    }

    #[test]
    fn duplicate_question_ids_abort_evaluation() {
        let q = quiz(vec![short_answer("q1"), short_answer("q1")]);
        assert!(evaluate_attempt(&q, &[]).is_err());
    }

    fn true_false(id: &str, correct: &[&str]) -> Question {
        question(
            id,
            QuestionKind::TrueFalse {
                options: vec![
                    QuestionOption {
                        id: "t".into(),
                        text: "True".into(),
                    },
                    QuestionOption {
                        id: "f".into(),
                        text: "False".into(),
                    },
                ],
                correct_option_ids: correct.iter().map(|c| c.to_string()).collect(),
            },
        )
    }

    #[test]
    fn true_false_grades_single_choice() {
        let q = quiz(vec![true_false("q1", &["t"])]);

        let result = evaluate_attempt(&q, &[Answer::selection("q1", ["t"])]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Correct));

        let result = evaluate_attempt(&q, &[Answer::selection("q1", ["f"])]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Incorrect));

        let result = evaluate_attempt(&q, &[Answer::selection("q1", ["t", "f"])]).unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Incorrect));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn true_false_with_two_correct_options_aborts_evaluation() {
        let q = quiz(vec![true_false("q1", &["t", "f"])]);
        let err = evaluate_attempt(&q, &[Answer::selection("q1", ["t", "f"])]).unwrap_err();
        assert_eq!(err.question_id(), "q1");
        assert!(err.to_string().contains("expected 2 and 1"));
    }

    #[test]
    fn true_false_with_extra_option_aborts_evaluation() {
        let mut tf = true_false("q1", &["t"]);
        if let QuestionKind::TrueFalse { options, .. } = &mut tf.kind {
            options.push(QuestionOption {
                id: "m".into(),
                text: "Maybe".into(),
            });
        }
        assert!(evaluate_attempt(&quiz(vec![tf]), &[]).is_err());
    }

    #[test]
    fn blank_marker_mismatch_aborts_evaluation() {
        let mut q = fill_in_blank("q1");
        if let QuestionKind::FillInBlank { template, .. } = &mut q.kind {
            template.push_str(" Its river is the {{blank}}.");
        }
        let err = evaluate_attempt(&quiz(vec![q]), &[Answer::blanks("q1", [("b1", "Paris")])])
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::DataIntegrity {
                question_id: "q1".into(),
                message: "template has 2 blank marker(s) but 1 blank(s) are defined".into(),
            }
        );
    }

    #[test]
    fn blank_without_accepted_answer_aborts_evaluation() {
        let mut q = fill_in_blank("q1");
        if let QuestionKind::FillInBlank { blanks, .. } = &mut q.kind {
            blanks[0].correct_answer = String::new();
            blanks[0].acceptable_answers = vec!["  ".into()];
        }
        let err = evaluate_attempt(&quiz(vec![q]), &[Answer::blanks("q1", [("b1", "anything")])])
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::DataIntegrity {
                question_id: "q1".into(),
                message: "blank 'b1' has no accepted answer".into(),
            }
        );
    }

    #[test]
    fn blank_with_only_an_alternate_is_gradable() {
        let mut q = fill_in_blank("q1");
        if let QuestionKind::FillInBlank { blanks, .. } = &mut q.kind {
            blanks[0].correct_answer = String::new();
        }
        let result = evaluate_attempt(&quiz(vec![q]), &[Answer::blanks("q1", [("b1", "PARIS")])])
            .unwrap();
        assert_eq!(result.outcome_of("q1"), Some(Outcome::Correct));
    }

    #[test]
    fn pass_threshold_decides_passed() {
        let mut q = quiz(vec![
            multiple_choice("q1", &["a"]),
            multiple_choice("q2", &["a"]),
            multiple_choice("q3", &["a"]),
            multiple_choice("q4", &["a"]),
        ]);
        q.pass_threshold = 75;
        let answers: Vec<_> = ["q1", "q2", "q3"]
            .iter()
            .map(|id| Answer::selection(*id, ["a"]))
            .collect();

        let result = evaluate_attempt(&q, &answers).unwrap();
        assert_eq!(result.percentage, 75);
        assert!(result.passed);
        assert_eq!(result.points_earned, 30);
    }
}
