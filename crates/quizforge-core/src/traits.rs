//! Collaborator traits for quiz snapshots and subscription tiers.
//!
//! The engine and validator take their inputs as explicit arguments; these
//! async traits describe where the surrounding services fetch them from.
//! In-memory implementations back the CLI and the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::capability::SubscriptionTier;
use crate::model::Quiz;

// ---------------------------------------------------------------------------
// Quiz snapshots
// ---------------------------------------------------------------------------

/// Source of published quiz snapshots.
#[async_trait]
pub trait QuizSnapshotProvider: Send + Sync {
    /// Fetch the published snapshot of `quiz_id`, or `None` if unknown.
    async fn get_quiz(&self, quiz_id: &str) -> anyhow::Result<Option<Quiz>>;
}

/// Snapshot store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryQuizStore {
    quizzes: RwLock<HashMap<String, Quiz>>,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `quizzes`. Later entries win on duplicate ids.
    pub fn with_quizzes(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        let map = quizzes.into_iter().map(|q| (q.id.clone(), q)).collect();
        Self {
            quizzes: RwLock::new(map),
        }
    }

    /// Publish (or replace) a snapshot.
    pub fn publish(&self, quiz: Quiz) -> anyhow::Result<()> {
        let mut quizzes = self
            .quizzes
            .write()
            .map_err(|_| anyhow::anyhow!("quiz store lock poisoned"))?;
        tracing::debug!(quiz = %quiz.id, questions = quiz.questions.len(), "publishing snapshot");
        quizzes.insert(quiz.id.clone(), quiz);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.quizzes.read().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QuizSnapshotProvider for InMemoryQuizStore {
    async fn get_quiz(&self, quiz_id: &str) -> anyhow::Result<Option<Quiz>> {
        let quizzes = self
            .quizzes
            .read()
            .map_err(|_| anyhow::anyhow!("quiz store lock poisoned"))?;
        Ok(quizzes.get(quiz_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Subscription tiers
// ---------------------------------------------------------------------------

/// Source of a user's current subscription tier.
#[async_trait]
pub trait TierProvider: Send + Sync {
    async fn tier_for(&self, user_id: &str) -> anyhow::Result<SubscriptionTier>;
}

/// Gives every user the same tier, with optional per-user overrides.
#[derive(Debug, Clone)]
pub struct FixedTier {
    default: SubscriptionTier,
    overrides: HashMap<String, SubscriptionTier>,
}

impl FixedTier {
    pub fn new(default: SubscriptionTier) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>, tier: SubscriptionTier) -> Self {
        self.overrides.insert(user_id.into(), tier);
        self
    }
}

#[async_trait]
impl TierProvider for FixedTier {
    async fn tier_for(&self, user_id: &str) -> anyhow::Result<SubscriptionTier> {
        Ok(self
            .overrides
            .get(user_id)
            .copied()
            .unwrap_or(self.default))
    }
}
