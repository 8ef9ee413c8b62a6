use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::scoring::Rating;
use crate::directory::domain::{KpiId, KpiKind, MemberId, TeamId};

/// Identifier wrapper for stored evaluations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EvaluationId(pub u64);

/// Persisted evaluation row. Append-only; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub member_id: MemberId,
    pub kpi_id: KpiId,
    pub rating: Rating,
    pub quant_value: Option<f64>,
    pub comment: Option<String>,
    pub evaluated_on: NaiveDate,
    pub evaluator: String,
    pub created_at: NaiveDateTime,
}

/// Insert payload handed to the store once a batch has been validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvaluation {
    pub member_id: MemberId,
    pub kpi_id: KpiId,
    pub rating: Rating,
    pub quant_value: Option<f64>,
    pub comment: Option<String>,
    pub evaluated_on: NaiveDate,
    pub evaluator: String,
}

/// One KPI's worth of input inside a batch submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationEntry {
    pub kpi_id: KpiId,
    pub rating: Rating,
    #[serde(default)]
    pub quant_value: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A full evaluation session: one member, one date, one evaluator, and
/// one entry per KPI being rated. The evaluator and date are captured
/// once and applied to every entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationBatch {
    pub member_id: MemberId,
    pub evaluated_on: NaiveDate,
    pub evaluator: String,
    pub entries: Vec<EvaluationEntry>,
}

/// Evaluation row joined with member, team, and KPI names, the shape the
/// store hands to reporting. The aggregation engine consumes nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub member_id: MemberId,
    pub member_name: String,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    pub kpi_id: KpiId,
    pub kpi_name: String,
    pub kpi_kind: KpiKind,
    pub rating: Rating,
    pub quant_value: Option<f64>,
    pub comment: Option<String>,
    pub evaluated_on: NaiveDate,
    pub evaluator: String,
}

impl EvaluationRecord {
    /// Inverted score as a float, ready for mean aggregation.
    pub fn score(&self) -> f64 {
        f64::from(self.rating.score())
    }
}
