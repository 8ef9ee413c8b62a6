use std::collections::BTreeSet;

use super::views::{AtRiskSummary, PerformanceInsights};
use crate::evaluations::domain::EvaluationRecord;
use crate::evaluations::scoring::{PerformanceTier, Rating};

pub(crate) fn generate_insights(
    records: &[EvaluationRecord],
    at_risk: &AtRiskSummary,
) -> PerformanceInsights {
    if records.is_empty() {
        return PerformanceInsights {
            evaluations: 0,
            members_evaluated: 0,
            overall_mean_score: None,
            overall_tier: None,
            overall_tier_label: None,
            observations: vec!["No evaluations in the selected window".to_string()],
        };
    }

    let evaluations = records.len();
    let members_evaluated = records
        .iter()
        .map(|record| record.member_name.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let overall_mean_score =
        records.iter().map(EvaluationRecord::score).sum::<f64>() / evaluations as f64;
    let overall_tier = PerformanceTier::from_mean_score(overall_mean_score);

    let mut observations = Vec::new();
    observations.push(format!(
        "{} evaluation(s) across {} member(s); overall mean score {:.2} ({})",
        evaluations,
        members_evaluated,
        overall_mean_score,
        overall_tier.label()
    ));

    let best_count = records
        .iter()
        .filter(|record| record.rating == Rating::BEST)
        .count();
    let worst_count = records
        .iter()
        .filter(|record| record.rating == Rating::WORST)
        .count();
    if worst_count > 0 {
        observations.push(format!(
            "{} deficient rating(s) recorded against {} top rating(s)",
            worst_count, best_count
        ));
    }

    push_at_risk_observation(&mut observations, "member", &at_risk.members);
    push_at_risk_observation(&mut observations, "KPI", &at_risk.kpis);
    push_at_risk_observation(&mut observations, "team", &at_risk.teams);

    if at_risk.is_empty() {
        observations.push("All tracked entities are above their risk thresholds".to_string());
    }

    PerformanceInsights {
        evaluations,
        members_evaluated,
        overall_mean_score: Some(overall_mean_score),
        overall_tier: Some(overall_tier),
        overall_tier_label: Some(overall_tier.label()),
        observations,
    }
}

fn push_at_risk_observation(
    observations: &mut Vec<String>,
    kind: &str,
    rows: &[super::views::RankingEntry],
) {
    if rows.is_empty() {
        return;
    }

    let names: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
    observations.push(format!(
        "{} {}(s) below the risk threshold: {}",
        rows.len(),
        kind,
        names.join(", ")
    ));
}
