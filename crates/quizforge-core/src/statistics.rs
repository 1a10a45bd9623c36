//! Aggregate statistics over graded submissions.
//!
//! Per-quiz play counts, average percentage and pass rate, per-question
//! correct rates, and a points leaderboard per user.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::engine::Outcome;
use crate::model::QuestionType;
use crate::report::GradedSubmission;

/// Aggregate statistics across a grading run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    pub per_quiz: BTreeMap<String, QuizStats>,
    pub per_user: BTreeMap<String, UserStats>,
}

/// Statistics for a single quiz across all of its graded attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStats {
    pub quiz_id: String,
    pub times_played: usize,
    pub average_percentage: f64,
    /// Fraction of attempts that passed, in `0.0..=1.0`.
    pub pass_rate: f64,
    pub total_points: u64,
    /// Essay answers still awaiting a human grader.
    pub pending_manual_review: u32,
    pub per_question: BTreeMap<String, QuestionStats>,
}

/// How one question fared across attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub question_type: QuestionType,
    pub correct: usize,
    /// Attempts in which the question was auto-graded.
    pub graded: usize,
    pub unanswered: usize,
    pub correct_rate: f64,
}

/// Statistics for a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub attempts: usize,
    pub passed: usize,
    pub total_points: u64,
    pub average_percentage: f64,
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub total_points: u64,
}

impl AggregateStats {
    /// Users ordered by total points, highest first. Ties share the order of
    /// their user ids.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut users: Vec<&UserStats> = self.per_user.values().collect();
        users.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        users
            .into_iter()
            .enumerate()
            .map(|(i, u)| LeaderboardEntry {
                rank: i + 1,
                user_id: u.user_id.clone(),
                total_points: u.total_points,
            })
            .collect()
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Compute aggregate statistics from graded submissions.
pub fn compute_aggregate_stats(graded: &[GradedSubmission]) -> AggregateStats {
    let mut by_quiz: HashMap<&str, Vec<&GradedSubmission>> = HashMap::new();
    let mut by_user: HashMap<&str, Vec<&GradedSubmission>> = HashMap::new();
    for g in graded {
        by_quiz.entry(g.quiz_id.as_str()).or_default().push(g);
        by_user.entry(g.user_id.as_str()).or_default().push(g);
    }

    let mut per_quiz = BTreeMap::new();
    for (quiz_id, group) in &by_quiz {
        let times_played = group.len();
        let average_percentage = mean(group.iter().map(|g| f64::from(g.result.percentage)));
        let pass_rate = group.iter().filter(|g| g.result.passed).count() as f64 / times_played as f64;
        let total_points = group.iter().map(|g| u64::from(g.result.points_earned)).sum();
        let pending_manual_review = group.iter().map(|g| g.result.pending_manual_review).sum();

        let mut per_question: BTreeMap<String, QuestionStats> = BTreeMap::new();
        for g in group {
            for eval in &g.result.per_question {
                let stats = per_question
                    .entry(eval.question_id.clone())
                    .or_insert_with(|| QuestionStats {
                        question_id: eval.question_id.clone(),
                        question_type: eval.question_type,
                        correct: 0,
                        graded: 0,
                        unanswered: 0,
                        correct_rate: 0.0,
                    });
                match eval.outcome {
                    Outcome::Correct => {
                        stats.correct += 1;
                        stats.graded += 1;
                    }
                    Outcome::Incorrect => stats.graded += 1,
                    Outcome::Pending => {}
                }
                if !eval.answered {
                    stats.unanswered += 1;
                }
            }
        }
        for stats in per_question.values_mut() {
            stats.correct_rate = if stats.graded == 0 {
                0.0
            } else {
                stats.correct as f64 / stats.graded as f64
            };
        }

        per_quiz.insert(
            quiz_id.to_string(),
            QuizStats {
                quiz_id: quiz_id.to_string(),
                times_played,
                average_percentage,
                pass_rate,
                total_points,
                pending_manual_review,
                per_question,
            },
        );
    }

    let per_user = by_user
        .iter()
        .map(|(user_id, group)| {
            let stats = UserStats {
                user_id: user_id.to_string(),
                attempts: group.len(),
                passed: group.iter().filter(|g| g.result.passed).count(),
                total_points: group.iter().map(|g| u64::from(g.result.points_earned)).sum(),
                average_percentage: mean(group.iter().map(|g| f64::from(g.result.percentage))),
            };
            (user_id.to_string(), stats)
        })
        .collect();

    AggregateStats { per_quiz, per_user }
}
