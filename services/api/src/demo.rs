use crate::infra::InMemoryStore;
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use teampulse::directory::domain::{EntityKind, KpiKind, Member, NewKpi, NewMember, NewTeam};
use teampulse::directory::DirectoryService;
use teampulse::error::AppError;
use teampulse::evaluations::domain::{EvaluationBatch, EvaluationEntry};
use teampulse::evaluations::scoring::Rating;
use teampulse::evaluations::EvaluationService;
use teampulse::imports::EvaluationCsvImporter;
use teampulse::reports::{
    performance_report, GroupKey, PerformanceReport, ReportOptions, RiskThresholds,
};
use teampulse::store::{EvaluationFilter, EvaluationStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum GroupByArg {
    #[default]
    Member,
    Team,
    Kpi,
    Date,
}

impl GroupByArg {
    fn key(self) -> GroupKey {
        match self {
            GroupByArg::Member => GroupKey::Member,
            GroupByArg::Team => GroupKey::Team,
            GroupByArg::Kpi => GroupKey::Kpi,
            GroupByArg::Date => GroupKey::Date,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Start of the evaluation window (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// End of the evaluation window (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// Dimension the ranking groups by
    #[arg(long, value_enum, default_value = "member")]
    pub(crate) group_by: GroupByArg,
    /// Replace the demo evaluation history with a CSV export
    #[arg(long)]
    pub(crate) import_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Append evaluation history from a CSV export
    #[arg(long)]
    pub(crate) import_csv: Option<PathBuf>,
    /// List every stored evaluation row after the report
    #[arg(long)]
    pub(crate) list_evaluations: bool,
}

struct DemoWorkspace {
    store: Arc<InMemoryStore>,
    directory: Arc<DirectoryService<InMemoryStore>>,
    evaluations: Arc<EvaluationService<InMemoryStore>>,
}

fn rating(value: u8) -> Rating {
    Rating::new(value).expect("demo ratings are within 1-4")
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        from,
        to,
        group_by,
        import_csv,
    } = args;

    let today = Local::now().date_naive();
    let workspace = seed_demo_workspace(today, import_csv.is_none());
    if let Some(path) = import_csv {
        import_history(&workspace, path)?;
    }

    let filter = EvaluationFilter {
        from,
        to,
        ..Default::default()
    };
    let records = match workspace.evaluations.list(&filter) {
        Ok(records) => records,
        Err(err) => {
            println!("Evaluations unavailable: {err}");
            return Ok(());
        }
    };

    let report = performance_report(
        &records,
        &RiskThresholds::default(),
        &ReportOptions {
            group_by: group_by.key(),
            include_trend: true,
            include_compliance: true,
        },
    );
    render_performance_report(&report, records.len());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        import_csv,
        list_evaluations,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    println!("TeamPulse demo (evaluated {today})");

    let workspace = seed_demo_workspace(today, true);
    if let Some(path) = import_csv {
        import_history(&workspace, path)?;
    }

    let records = match workspace.evaluations.list(&EvaluationFilter::default()) {
        Ok(records) => records,
        Err(err) => {
            println!("Evaluations unavailable: {err}");
            return Ok(());
        }
    };

    let report = performance_report(
        &records,
        &RiskThresholds::default(),
        &ReportOptions::default(),
    );
    render_performance_report(&report, records.len());

    if list_evaluations {
        println!("\nStored evaluations (newest first)");
        for record in &records {
            let value_note = match record.quant_value {
                Some(value) => format!(" | {value:.0}% complete"),
                None => String::new(),
            };
            println!(
                "- {} | {} | {} | rating {} ({}){}",
                record.evaluated_on,
                record.member_name,
                record.kpi_name,
                record.rating,
                record.rating.label(),
                value_note
            );
        }
    }

    Ok(())
}

fn import_history(workspace: &DemoWorkspace, path: PathBuf) -> Result<(), AppError> {
    let members = match workspace.directory.members(true, None) {
        Ok(members) => members,
        Err(err) => {
            println!("Directory unavailable: {err}");
            return Ok(());
        }
    };
    let kpis = match workspace.directory.kpis(true, None) {
        Ok(kpis) => kpis,
        Err(err) => {
            println!("Directory unavailable: {err}");
            return Ok(());
        }
    };

    let outcome = EvaluationCsvImporter::from_path(path, &members, &kpis)?;
    println!(
        "Imported {} evaluation(s), skipped {} row(s)",
        outcome.evaluations.len(),
        outcome.skipped.len()
    );
    for skipped in &outcome.skipped {
        println!("  - line {}: {}", skipped.line, skipped.reason);
    }

    for evaluation in outcome.evaluations {
        if let Err(err) = workspace.store.insert_evaluation(evaluation) {
            println!("  Store rejected an imported row: {err}");
            break;
        }
    }
    Ok(())
}

/// Seeds the directory, and optionally three weekly evaluation rounds, so
/// demo and report output is populated out of the box.
fn seed_demo_workspace(today: NaiveDate, with_history: bool) -> DemoWorkspace {
    let store = Arc::new(InMemoryStore::default());
    let workspace = DemoWorkspace {
        directory: Arc::new(DirectoryService::new(store.clone())),
        evaluations: Arc::new(EvaluationService::new(store.clone())),
        store,
    };

    let platform = workspace.directory.create_team(NewTeam {
        name: "Platform".to_string(),
        description: Some("Core services and infrastructure".to_string()),
    });
    let delivery = workspace.directory.create_team(NewTeam {
        name: "Delivery".to_string(),
        description: Some("Customer-facing feature squad".to_string()),
    });
    let (Ok(platform), Ok(delivery)) = (platform, delivery) else {
        return workspace;
    };

    let seed_member = |name: &str, role: &str, team, leader| {
        workspace
            .directory
            .create_member(NewMember {
                name: name.to_string(),
                role: Some(role.to_string()),
                team_id: team,
                leader,
            })
            .ok()
    };
    let ana = seed_member("Ana Torres", "Tech Lead", Some(platform.id), true);
    let bruno = seed_member("Bruno Silva", "Engineer", Some(platform.id), false);
    let carla = seed_member("Carla Gomez", "QA Lead", Some(delivery.id), true);
    let diego = seed_member("Diego Ruiz", "Contractor", None, false);

    let seed_kpi = |name: &str, description: &str, kind| {
        workspace
            .directory
            .create_kpi(NewKpi {
                name: name.to_string(),
                description: Some(description.to_string()),
                kind,
            })
            .ok()
    };
    let collaboration = seed_kpi(
        "Collaboration",
        "Peer support and communication",
        KpiKind::Qualitative,
    );
    let code_quality = seed_kpi(
        "Code Quality",
        "Review findings and defect escapes",
        KpiKind::Qualitative,
    );
    let sprint_goals = seed_kpi(
        "Sprint Goals",
        "Committed scope delivered per sprint",
        KpiKind::Quantitative,
    );
    let incident_response = seed_kpi(
        "Incident Response",
        "On-call acknowledgements within SLA",
        KpiKind::Quantitative,
    );

    if !with_history {
        return workspace;
    }

    let (Some(ana), Some(bruno), Some(carla), Some(diego)) = (ana, bruno, carla, diego) else {
        return workspace;
    };
    let (Some(collaboration), Some(code_quality), Some(sprint_goals), Some(incident_response)) =
        (collaboration, code_quality, sprint_goals, incident_response)
    else {
        return workspace;
    };

    // Three weekly evaluation rounds leading up to the report date.
    let rounds: [(&Member, i64, [(u8, Option<f64>); 4]); 9] = [
        (&ana, 21, [(1, None), (1, None), (1, Some(96.0)), (2, Some(88.0))]),
        (&ana, 14, [(1, None), (2, None), (1, Some(93.0)), (1, Some(95.0))]),
        (&ana, 7, [(1, None), (1, None), (2, Some(84.0)), (1, Some(91.0))]),
        (&bruno, 21, [(3, None), (2, None), (3, Some(62.0)), (2, Some(78.0))]),
        (&bruno, 14, [(2, None), (3, None), (2, Some(76.0)), (3, Some(58.0))]),
        (&bruno, 7, [(3, None), (3, None), (4, Some(41.0)), (3, Some(63.0))]),
        (&carla, 21, [(2, None), (1, None), (2, Some(81.0)), (2, Some(83.0))]),
        (&carla, 14, [(1, None), (2, None), (2, Some(79.0)), (1, Some(92.0))]),
        (&carla, 7, [(2, None), (2, None), (1, Some(94.0)), (2, Some(86.0))]),
    ];
    let kpis = [&collaboration, &code_quality, &sprint_goals, &incident_response];

    for (member, days_ago, grades) in rounds {
        let entries = kpis
            .iter()
            .zip(grades)
            .map(|(kpi, (grade, value))| EvaluationEntry {
                kpi_id: kpi.id,
                rating: rating(grade),
                quant_value: value,
                comment: None,
            })
            .collect();
        submit_round(&workspace, member, today - Duration::days(days_ago), entries);
    }

    // Diego's history predates his departure; deactivating him must not
    // erase it from the aggregates.
    submit_round(
        &workspace,
        &diego,
        today - Duration::days(21),
        vec![
            EvaluationEntry {
                kpi_id: collaboration.id,
                rating: rating(4),
                quant_value: None,
                comment: Some("Unresponsive during the incident review".to_string()),
            },
            EvaluationEntry {
                kpi_id: sprint_goals.id,
                rating: rating(4),
                quant_value: Some(35.0),
                comment: None,
            },
        ],
    );
    if let Err(err) = workspace
        .directory
        .deactivate(EntityKind::Member, diego.id.0)
    {
        println!("Could not deactivate demo member: {err}");
    }

    workspace
}

fn submit_round(
    workspace: &DemoWorkspace,
    member: &Member,
    evaluated_on: NaiveDate,
    entries: Vec<EvaluationEntry>,
) {
    let batch = EvaluationBatch {
        member_id: member.id,
        evaluated_on,
        evaluator: "Team Lead".to_string(),
        entries,
    };
    if let Err(err) = workspace.evaluations.submit(batch) {
        println!("Could not seed evaluations for {}: {err}", member.name);
    }
}

fn render_performance_report(report: &PerformanceReport, fetched: usize) {
    println!(
        "\nPerformance ranking by {} ({} evaluation(s))",
        report.group_by.label(),
        fetched
    );
    if report.ranking.is_empty() {
        println!("- no data");
    }
    for row in &report.ranking {
        println!(
            "- {}: mean score {:.2} ({}) over {} evaluation(s)",
            row.label, row.mean_score, row.tier_label, row.count
        );
    }

    let distribution = &report.rating_distribution;
    println!(
        "\nRating distribution: {} excellent | {} good | {} regular | {} deficient",
        distribution.excellent, distribution.good, distribution.regular, distribution.deficient
    );

    if let Some(trend) = &report.trend {
        println!("\nScore trend");
        for point in trend {
            println!(
                "- {}: mean score {:.2} ({} evaluation(s))",
                point.date, point.mean_score, point.count
            );
        }
    }

    if let Some(compliance) = &report.compliance {
        println!("\nQuantitative compliance");
        if compliance.is_empty() {
            println!("- no quantitative samples");
        }
        for entry in compliance {
            println!(
                "- {}: {:.1}% mean completion ({} sample(s))",
                entry.kpi, entry.mean_percentage, entry.samples
            );
        }
    }

    if report.at_risk.is_empty() {
        println!("\nAt risk: none");
    } else {
        println!("\nAt risk");
        for row in &report.at_risk.members {
            println!("- member {}: mean score {:.2}", row.label, row.mean_score);
        }
        for row in &report.at_risk.kpis {
            println!("- KPI {}: mean score {:.2}", row.label, row.mean_score);
        }
        for row in &report.at_risk.teams {
            println!("- team {}: mean score {:.2}", row.label, row.mean_score);
        }
    }

    println!("\nInsights");
    for observation in &report.insights.observations {
        println!("- {}", observation);
    }
}
