use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::insights::generate_insights;
use super::views::{
    AtRiskSummary, ComplianceEntry, PerformanceReport, RankingEntry, RatingDistribution,
    TrendPoint, TrendSeries,
};
use crate::directory::domain::KpiKind;
use crate::evaluations::domain::EvaluationRecord;
use crate::evaluations::scoring::PerformanceTier;

/// Dimension an aggregate groups evaluation records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Member,
    Team,
    Kpi,
    Date,
}

impl GroupKey {
    pub const fn label(self) -> &'static str {
        match self {
            GroupKey::Member => "member",
            GroupKey::Team => "team",
            GroupKey::Kpi => "kpi",
            GroupKey::Date => "date",
        }
    }
}

/// Mean-score floors below which an entity is flagged at risk. The
/// defaults match the reporting views; all three are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub member: f64,
    pub kpi: f64,
    pub team: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            member: 2.0,
            kpi: 2.5,
            team: 2.5,
        }
    }
}

/// Sections to include when assembling a full performance report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub group_by: GroupKey,
    pub include_trend: bool,
    pub include_compliance: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            group_by: GroupKey::Member,
            include_trend: true,
            include_compliance: true,
        }
    }
}

#[derive(Default)]
struct MeanAccumulator {
    total: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

fn group_label(record: &EvaluationRecord, key: GroupKey) -> Option<String> {
    match key {
        GroupKey::Member => Some(record.member_name.clone()),
        // Records whose member has no team drop out of a by-team grouping.
        GroupKey::Team => record.team_name.clone(),
        GroupKey::Kpi => Some(record.kpi_name.clone()),
        GroupKey::Date => Some(record.evaluated_on.to_string()),
    }
}

/// Groups records by the given key and computes mean score and sample
/// count per group. Rows come back sorted descending by mean score;
/// groups with equal means stay in label-ascending order because the
/// `BTreeMap` iterates that way and the sort is stable.
pub fn aggregate(records: &[EvaluationRecord], key: GroupKey) -> Vec<RankingEntry> {
    let mut groups: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
    for record in records {
        let Some(label) = group_label(record, key) else {
            continue;
        };
        groups.entry(label).or_default().push(record.score());
    }

    let mut rows: Vec<RankingEntry> = groups
        .into_iter()
        .map(|(label, acc)| {
            let mean_score = acc.mean();
            let tier = PerformanceTier::from_mean_score(mean_score);
            RankingEntry {
                label,
                mean_score,
                count: acc.count,
                tier,
                tier_label: tier.label(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.mean_score
            .partial_cmp(&a.mean_score)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Rows whose mean score falls strictly below the threshold, in the
/// ranked order they arrived in.
pub fn risk(rows: &[RankingEntry], threshold: f64) -> Vec<RankingEntry> {
    rows.iter()
        .filter(|row| row.mean_score < threshold)
        .cloned()
        .collect()
}

/// Mean stored completion percentage per quantitative KPI. Qualitative
/// records are ignored entirely; a KPI with no quantitative samples
/// produces no row.
pub fn quantitative_compliance(records: &[EvaluationRecord]) -> Vec<ComplianceEntry> {
    let mut groups: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
    for record in records {
        if record.kpi_kind != KpiKind::Quantitative {
            continue;
        }
        let Some(value) = record.quant_value else {
            continue;
        };
        groups.entry(record.kpi_name.clone()).or_default().push(value);
    }

    let mut rows: Vec<ComplianceEntry> = groups
        .into_iter()
        .map(|(kpi, acc)| ComplianceEntry {
            kpi,
            mean_percentage: acc.mean(),
            samples: acc.count,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.mean_percentage
            .partial_cmp(&a.mean_percentage)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Mean score per evaluation date in ascending date order. Dates with no
/// evaluations produce no bucket; nothing is zero-filled.
pub fn trend(records: &[EvaluationRecord]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, MeanAccumulator> = BTreeMap::new();
    for record in records {
        buckets
            .entry(record.evaluated_on)
            .or_default()
            .push(record.score());
    }

    buckets
        .into_iter()
        .map(|(date, acc)| TrendPoint {
            date,
            mean_score: acc.mean(),
            count: acc.count,
        })
        .collect()
}

/// Per-group time series: one series per member/team/KPI, each in
/// ascending date order with empty buckets omitted.
pub fn trend_by(records: &[EvaluationRecord], series_key: GroupKey) -> Vec<TrendSeries> {
    let mut series: BTreeMap<String, BTreeMap<NaiveDate, MeanAccumulator>> = BTreeMap::new();
    for record in records {
        let Some(label) = group_label(record, series_key) else {
            continue;
        };
        series
            .entry(label)
            .or_default()
            .entry(record.evaluated_on)
            .or_default()
            .push(record.score());
    }

    series
        .into_iter()
        .map(|(label, buckets)| TrendSeries {
            label,
            points: buckets
                .into_iter()
                .map(|(date, acc)| TrendPoint {
                    date,
                    mean_score: acc.mean(),
                    count: acc.count,
                })
                .collect(),
        })
        .collect()
}

/// Raw rating counts, the one aggregate that reads ratings instead of
/// scores.
pub fn rating_distribution(records: &[EvaluationRecord]) -> RatingDistribution {
    let mut counts = [0usize; 4];
    for record in records {
        counts[(record.rating.value() - 1) as usize] += 1;
    }
    RatingDistribution {
        excellent: counts[0],
        good: counts[1],
        regular: counts[2],
        deficient: counts[3],
    }
}

/// Assembles the full report: ranked table for the requested grouping,
/// rating distribution, optional trend and compliance sections, at-risk
/// entities across all three kinds, and derived insights.
pub fn performance_report(
    records: &[EvaluationRecord],
    thresholds: &RiskThresholds,
    options: &ReportOptions,
) -> PerformanceReport {
    let ranking = aggregate(records, options.group_by);

    let member_rows = aggregate(records, GroupKey::Member);
    let kpi_rows = aggregate(records, GroupKey::Kpi);
    let team_rows = aggregate(records, GroupKey::Team);
    let at_risk = AtRiskSummary {
        members: risk(&member_rows, thresholds.member),
        kpis: risk(&kpi_rows, thresholds.kpi),
        teams: risk(&team_rows, thresholds.team),
    };

    let insights = generate_insights(records, &at_risk);

    PerformanceReport {
        group_by: options.group_by,
        ranking,
        rating_distribution: rating_distribution(records),
        trend: options.include_trend.then(|| trend(records)),
        compliance: options
            .include_compliance
            .then(|| quantitative_compliance(records)),
        at_risk,
        insights,
    }
}
