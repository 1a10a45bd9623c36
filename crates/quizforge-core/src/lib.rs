//! quizforge-core: quiz content model and grading engine.
//!
//! This crate defines the question variants a quiz is built from, the
//! subscription capability matrix that gates authoring, the authoring
//! validator, and the answer evaluation engine. Everything under `model`,
//! `capability`, `validator`, and `engine` is pure: it takes a snapshot and a
//! tier as arguments and never touches disk or network.

pub mod attempt;
pub mod batch;
pub mod capability;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod traits;
pub mod validator;

pub use capability::{capabilities_for, CapabilityMatrix, SubscriptionTier};
pub use engine::{evaluate_attempt, EvaluationResult};
pub use validator::{validate_quiz, ValidationReport};
