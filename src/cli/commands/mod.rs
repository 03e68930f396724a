pub mod inspect;
pub mod merge;
pub mod run;

use crate::model::MergeReport;
use serde::Serialize;
use umya_spreadsheet::helper::coordinate::string_from_column_index;

/// JSON view of a merge report with columns as letters.
#[derive(Debug, Serialize)]
pub(crate) struct ReportSummary {
    existing_rows: u32,
    appended: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_appended_row: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_appended_row: Option<u32>,
    appended_keys: Vec<String>,
    duplicates: Vec<String>,
    skipped_empty_key: usize,
    formula_columns: Vec<String>,
}

impl From<&MergeReport> for ReportSummary {
    fn from(report: &MergeReport) -> Self {
        Self {
            existing_rows: report.existing_rows,
            appended: report.appended_count(),
            first_appended_row: report.first_appended_row(),
            last_appended_row: report.last_appended_row(),
            appended_keys: report.appended.iter().map(|row| row.key.clone()).collect(),
            duplicates: report.duplicates.clone(),
            skipped_empty_key: report.skipped_empty_key,
            formula_columns: report
                .formula_columns
                .iter()
                .map(string_from_column_index)
                .collect(),
        }
    }
}
