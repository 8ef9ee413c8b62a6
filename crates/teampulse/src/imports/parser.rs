use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::EvaluationImportError;
use crate::evaluations::scoring::Rating;

#[derive(Debug)]
pub(crate) struct ImportRow {
    pub(crate) line: u64,
    pub(crate) member: String,
    pub(crate) kpi: String,
    pub(crate) rating: Rating,
    pub(crate) value: Option<f64>,
    pub(crate) date: NaiveDate,
    pub(crate) evaluator: String,
    pub(crate) comment: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>, EvaluationImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        // Header occupies line 1.
        let line = index as u64 + 2;
        let row = record?;

        let rating = Rating::new(row.rating)
            .map_err(|err| EvaluationImportError::Row {
                line,
                reason: err.to_string(),
            })?;

        let value = row
            .value
            .as_deref()
            .map(|raw| {
                raw.parse::<f64>().map_err(|_| EvaluationImportError::Row {
                    line,
                    reason: format!("'{raw}' is not a valid completion percentage"),
                })
            })
            .transpose()?;

        let date = parse_date(&row.date).ok_or_else(|| EvaluationImportError::Row {
            line,
            reason: format!("'{}' is not a valid date", row.date),
        })?;

        rows.push(ImportRow {
            line,
            member: normalize_name(&row.member),
            kpi: normalize_name(&row.kpi),
            rating,
            value,
            date,
            evaluator: row.evaluator,
            comment: row.comment,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Member")]
    member: String,
    #[serde(rename = "KPI")]
    kpi: String,
    #[serde(rename = "Rating")]
    rating: u8,
    #[serde(rename = "Value", default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Evaluator")]
    evaluator: String,
    #[serde(rename = "Comment", default, deserialize_with = "empty_string_as_none")]
    comment: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Lowercases, strips a leading BOM, and collapses runs of whitespace so
/// spreadsheet exports match directory names.
pub(crate) fn normalize_name(value: &str) -> String {
    value
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_date(value)
}
