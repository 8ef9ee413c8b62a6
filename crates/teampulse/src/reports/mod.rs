//! Aggregate analytics over fetched evaluation records.
//!
//! Every function here is pure over the supplied slice: no store access,
//! no shared state, safe to call concurrently from any number of report
//! requests. An empty record set yields empty tables and series; the
//! caller decides how to render "no data".

mod insights;
mod summary;
pub mod views;


pub use summary::{
    aggregate, performance_report, quantitative_compliance, rating_distribution, risk, trend,
    trend_by, GroupKey, ReportOptions, RiskThresholds,
};
pub use views::{
    AtRiskSummary, ComplianceEntry, PerformanceInsights, PerformanceReport, RankingEntry,
    RatingDistribution, TrendPoint, TrendSeries,
};
