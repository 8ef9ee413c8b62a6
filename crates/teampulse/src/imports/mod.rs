//! Bulk import of historical evaluations from spreadsheet exports.
//!
//! Expected headers: `Member,KPI,Rating,Value,Date,Evaluator,Comment`.
//! Member and KPI names match the directory case- and
//! whitespace-insensitively; rows naming unknown entries are skipped and
//! reported, not fatal.

mod parser;

use std::io::Read;
use std::path::Path;

use parser::{normalize_name, ImportRow};

use crate::directory::domain::{Kpi, KpiKind, Member};
use crate::evaluations::domain::NewEvaluation;

#[derive(Debug)]
pub enum EvaluationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, reason: String },
}

impl std::fmt::Display for EvaluationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationImportError::Io(err) => {
                write!(f, "failed to read evaluation export: {}", err)
            }
            EvaluationImportError::Csv(err) => write!(f, "invalid evaluation CSV data: {}", err),
            EvaluationImportError::Row { line, reason } => {
                write!(f, "line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for EvaluationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvaluationImportError::Io(err) => Some(err),
            EvaluationImportError::Csv(err) => Some(err),
            EvaluationImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for EvaluationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for EvaluationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A row the importer could parse but not resolve against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Parsed and resolved import: evaluations ready for the store plus the
/// rows that were skipped.
#[derive(Debug)]
pub struct ImportOutcome {
    pub evaluations: Vec<NewEvaluation>,
    pub skipped: Vec<SkippedRow>,
}

pub struct EvaluationCsvImporter;

impl EvaluationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        members: &[Member],
        kpis: &[Kpi],
    ) -> Result<ImportOutcome, EvaluationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, members, kpis)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        members: &[Member],
        kpis: &[Kpi],
    ) -> Result<ImportOutcome, EvaluationImportError> {
        let rows = parser::parse_rows(reader)?;
        let mut evaluations = Vec::new();
        let mut skipped = Vec::new();

        for row in rows {
            match resolve_row(row, members, kpis) {
                Ok(evaluation) => evaluations.push(evaluation),
                Err(skip) => skipped.push(skip),
            }
        }

        Ok(ImportOutcome {
            evaluations,
            skipped,
        })
    }
}

fn resolve_row(
    row: ImportRow,
    members: &[Member],
    kpis: &[Kpi],
) -> Result<NewEvaluation, SkippedRow> {
    let member = members
        .iter()
        .find(|member| normalize_name(&member.name) == row.member)
        .ok_or_else(|| SkippedRow {
            line: row.line,
            reason: format!("unknown member '{}'", row.member),
        })?;

    let kpi = kpis
        .iter()
        .find(|kpi| normalize_name(&kpi.name) == row.kpi)
        .ok_or_else(|| SkippedRow {
            line: row.line,
            reason: format!("unknown KPI '{}'", row.kpi),
        })?;

    match (kpi.kind, row.value) {
        (KpiKind::Quantitative, None) => Err(SkippedRow {
            line: row.line,
            reason: format!("KPI '{}' requires a completion percentage", kpi.name),
        }),
        (KpiKind::Qualitative, Some(_)) => Err(SkippedRow {
            line: row.line,
            reason: format!("KPI '{}' does not accept a completion percentage", kpi.name),
        }),
        (KpiKind::Quantitative, Some(value)) if !(0.0..=100.0).contains(&value) => {
            Err(SkippedRow {
                line: row.line,
                reason: format!("completion percentage {value} is outside 0-100"),
            })
        }
        _ => Ok(NewEvaluation {
            member_id: member.id,
            kpi_id: kpi.id,
            rating: row.rating,
            quant_value: row.value,
            comment: row.comment,
            evaluated_on: row.date,
            evaluator: row.evaluator,
        }),
    }
}
