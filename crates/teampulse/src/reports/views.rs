use chrono::NaiveDate;
use serde::Serialize;

use super::summary::GroupKey;
use crate::evaluations::scoring::PerformanceTier;

/// One row of a ranked aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub label: String,
    pub mean_score: f64,
    pub count: usize,
    pub tier: PerformanceTier,
    pub tier_label: &'static str,
}

/// One bucket of a score time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mean_score: f64,
    pub count: usize,
}

/// A labelled time series for per-member/team/KPI trend charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub label: String,
    pub points: Vec<TrendPoint>,
}

/// Mean completion percentage for one quantitative KPI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceEntry {
    pub kpi: String,
    pub mean_percentage: f64,
    pub samples: usize,
}

/// Raw rating counts across the record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    pub excellent: usize,
    pub good: usize,
    pub regular: usize,
    pub deficient: usize,
}

impl RatingDistribution {
    pub fn total(&self) -> usize {
        self.excellent + self.good + self.regular + self.deficient
    }
}

/// Entities whose mean score fell below their risk threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtRiskSummary {
    pub members: Vec<RankingEntry>,
    pub kpis: Vec<RankingEntry>,
    pub teams: Vec<RankingEntry>,
}

impl AtRiskSummary {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.kpis.is_empty() && self.teams.is_empty()
    }
}

/// Headline numbers and textual observations derived from the record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceInsights {
    pub evaluations: usize,
    pub members_evaluated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_mean_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_tier: Option<PerformanceTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_tier_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}

/// The complete report payload the UI renders as charts and grids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub group_by: GroupKey,
    pub ranking: Vec<RankingEntry>,
    pub rating_distribution: RatingDistribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Vec<TrendPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<Vec<ComplianceEntry>>,
    pub at_risk: AtRiskSummary,
    pub insights: PerformanceInsights,
}
