use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{Evaluation, EvaluationBatch, EvaluationRecord, NewEvaluation};
use super::scoring::{suggest_rating, Rating};
use crate::directory::domain::{KpiId, KpiKind};
use crate::store::{DirectoryStore, EvaluationFilter, EvaluationStore, StoreError};

/// Validation failures rejected before any row is written.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationViolation {
    #[error("evaluator must not be empty")]
    EmptyEvaluator,
    #[error("batch contains no entries")]
    EmptyBatch,
    #[error("member {0} does not exist")]
    UnknownMember(u64),
    #[error("KPI {0} does not exist")]
    UnknownKpi(u64),
    #[error("KPI '{kpi}' is quantitative and requires a completion percentage")]
    MissingQuantValue { kpi: String },
    #[error("KPI '{kpi}' is qualitative and does not accept a completion percentage")]
    UnexpectedQuantValue { kpi: String },
    #[error("completion percentage {value} for KPI '{kpi}' is outside 0-100")]
    PercentageOutOfRange { kpi: String, value: f64 },
    #[error("suggestions only apply to quantitative KPIs; '{kpi}' is qualitative")]
    SuggestionNotApplicable { kpi: String },
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Validation(#[from] EvaluationViolation),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Threshold suggestion payload returned to the evaluation form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSuggestion {
    pub kpi_id: KpiId,
    pub kpi_name: String,
    pub percentage: f64,
    pub rating: Rating,
    pub rating_label: &'static str,
}

/// Evaluation intake and retrieval over the store boundary.
pub struct EvaluationService<S> {
    store: Arc<S>,
}

impl<S> EvaluationService<S>
where
    S: DirectoryStore + EvaluationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validates the whole batch up front, then inserts one row per entry.
    /// The insert loop is not transactional: rows stored before a failure
    /// stay stored. Duplicate submissions for the same member/KPI/date are
    /// accepted as independent samples.
    pub fn submit(
        &self,
        batch: EvaluationBatch,
    ) -> Result<Vec<Evaluation>, EvaluationServiceError> {
        let evaluator = batch.evaluator.trim();
        if evaluator.is_empty() {
            return Err(EvaluationViolation::EmptyEvaluator.into());
        }
        if batch.entries.is_empty() {
            return Err(EvaluationViolation::EmptyBatch.into());
        }

        let member = self
            .store
            .member(batch.member_id)?
            .ok_or(EvaluationViolation::UnknownMember(batch.member_id.0))?;

        let mut pending = Vec::with_capacity(batch.entries.len());
        for entry in &batch.entries {
            let kpi = self
                .store
                .kpi(entry.kpi_id)?
                .ok_or(EvaluationViolation::UnknownKpi(entry.kpi_id.0))?;

            match (kpi.kind, entry.quant_value) {
                (KpiKind::Quantitative, None) => {
                    return Err(EvaluationViolation::MissingQuantValue { kpi: kpi.name }.into());
                }
                (KpiKind::Qualitative, Some(_)) => {
                    return Err(EvaluationViolation::UnexpectedQuantValue { kpi: kpi.name }.into());
                }
                (KpiKind::Quantitative, Some(value)) if !(0.0..=100.0).contains(&value) => {
                    return Err(EvaluationViolation::PercentageOutOfRange {
                        kpi: kpi.name,
                        value,
                    }
                    .into());
                }
                _ => {}
            }

            pending.push(NewEvaluation {
                member_id: batch.member_id,
                kpi_id: entry.kpi_id,
                rating: entry.rating,
                quant_value: entry.quant_value,
                comment: entry
                    .comment
                    .clone()
                    .filter(|comment| !comment.trim().is_empty()),
                evaluated_on: batch.evaluated_on,
                evaluator: evaluator.to_string(),
            });
        }

        let mut saved = Vec::with_capacity(pending.len());
        for evaluation in pending {
            saved.push(self.store.insert_evaluation(evaluation)?);
        }

        info!(
            member = %member.name,
            count = saved.len(),
            evaluated_on = %batch.evaluated_on,
            "evaluation batch stored"
        );
        Ok(saved)
    }

    /// Filtered, joined evaluation rows for listings and report callers.
    pub fn list(
        &self,
        filter: &EvaluationFilter,
    ) -> Result<Vec<EvaluationRecord>, EvaluationServiceError> {
        self.store.evaluations(filter).map_err(Into::into)
    }

    /// Threshold suggestion for a quantitative KPI. The caller shows it as
    /// a default; the rating that gets stored is whatever the evaluator
    /// confirms in `submit`.
    pub fn suggestion(
        &self,
        kpi_id: KpiId,
        percentage: f64,
    ) -> Result<RatingSuggestion, EvaluationServiceError> {
        let kpi = self
            .store
            .kpi(kpi_id)?
            .ok_or(EvaluationViolation::UnknownKpi(kpi_id.0))?;

        if kpi.kind != KpiKind::Quantitative {
            return Err(EvaluationViolation::SuggestionNotApplicable { kpi: kpi.name }.into());
        }
        if !(0.0..=100.0).contains(&percentage) {
            return Err(EvaluationViolation::PercentageOutOfRange {
                kpi: kpi.name,
                value: percentage,
            }
            .into());
        }

        let rating = suggest_rating(percentage);
        Ok(RatingSuggestion {
            kpi_id,
            kpi_name: kpi.name,
            percentage,
            rating,
            rating_label: rating.label(),
        })
    }
}
