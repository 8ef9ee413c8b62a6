//! Evaluation intake and the rating-level half of the scoring engine.
//!
//! A submission is a batch: one member, one date, one evaluator, one
//! entry per KPI. Batches are validated before anything is written; the
//! insert loop itself is append-only and not transactional.

pub mod domain;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Evaluation, EvaluationBatch, EvaluationEntry, EvaluationId, EvaluationRecord, NewEvaluation,
};
pub use router::evaluation_router;
pub use scoring::{suggest_rating, InvalidRating, PerformanceTier, Rating};
pub use service::{
    EvaluationService, EvaluationServiceError, EvaluationViolation, RatingSuggestion,
};
