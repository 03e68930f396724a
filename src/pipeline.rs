use crate::config::{InputSource, MergeSettings};
use crate::ingest::{IngestOptions, load_candidates};
use crate::merge::merge_rows;
use crate::model::{FieldMapping, MergeReport};
use crate::repository::locate_template;
use crate::workbook::{open_template, target_sheet_mut};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use strum::{AsRefStr, Display};
use umya_spreadsheet::Spreadsheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Profile,
    Audit,
}

impl DatasetKind {
    /// Profile exports line up column for column with their template; audit
    /// workbooks are matched by header name.
    pub fn default_mapping(self) -> FieldMapping {
        match self {
            DatasetKind::Profile => FieldMapping::Positional,
            DatasetKind::Audit => FieldMapping::Header,
        }
    }

    fn data_label(self) -> String {
        format!("{self}_data")
    }

    fn template_label(self) -> String {
        format!("{self}_template")
    }
}

/// One dataset to merge: the uploaded data plus how to find its template.
#[derive(Debug, Clone)]
pub struct DatasetRequest {
    pub kind: DatasetKind,
    pub data: Option<PathBuf>,
    /// Explicit template, used when the input source is `upload`.
    pub template: Option<PathBuf>,
    /// File-name pattern, used when the input source is `path`.
    pub template_glob: String,
    pub prefix: String,
    pub mapping: FieldMapping,
}

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input_source: InputSource,
    pub template_dir: Option<PathBuf>,
    pub datasets: Vec<DatasetRequest>,
    pub ingest: IngestOptions,
    pub date: NaiveDate,
}

impl RunRequest {
    /// Build the usual profile + audit request from resolved settings.
    pub fn from_settings(
        settings: &MergeSettings,
        profile: DatasetPaths,
        audit: DatasetPaths,
        date: NaiveDate,
    ) -> Self {
        let dataset = |kind: DatasetKind, paths: DatasetPaths, glob: &str, prefix: &str| {
            DatasetRequest {
                kind,
                data: paths.data,
                template: paths.template,
                template_glob: glob.to_string(),
                prefix: prefix.to_string(),
                mapping: kind.default_mapping(),
            }
        };
        Self {
            input_source: settings.input_source,
            template_dir: settings.template_dir.clone(),
            datasets: vec![
                dataset(
                    DatasetKind::Profile,
                    profile,
                    &settings.profile_template_glob,
                    &settings.profile_prefix,
                ),
                dataset(
                    DatasetKind::Audit,
                    audit,
                    &settings.audit_template_glob,
                    &settings.audit_prefix,
                ),
            ],
            ingest: IngestOptions {
                csv_delimiter: settings.csv_delimiter,
            },
            date,
        }
    }

    /// Inputs that must be supplied before the run can start.
    pub fn missing_inputs(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for dataset in &self.datasets {
            if dataset.data.is_none() {
                missing.push(dataset.kind.data_label());
            }
            if self.input_source == InputSource::Upload && dataset.template.is_none() {
                missing.push(dataset.kind.template_label());
            }
        }
        if self.input_source == InputSource::Path && self.template_dir.is_none() {
            missing.push("template_dir".to_string());
        }
        missing
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatasetPaths {
    pub data: Option<PathBuf>,
    pub template: Option<PathBuf>,
}

#[derive(Debug)]
pub enum RunOutcome {
    NotReady { missing: Vec<String> },
    Completed(Vec<ProcessedWorkbook>),
}

/// A merged workbook held in memory until the sink writes it.
#[derive(Debug)]
pub struct ProcessedWorkbook {
    pub dataset: DatasetKind,
    pub file_name: String,
    pub template: PathBuf,
    pub data: PathBuf,
    pub report: MergeReport,
    pub book: Spreadsheet,
}

pub fn output_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}Data_{}.xlsx", date.format("%d%m%Y"))
}

/// Run every dataset of `request`. Nothing is written here: either all
/// datasets merge and come back in memory, or the first failure is returned.
pub fn execute(request: &RunRequest) -> Result<RunOutcome> {
    let missing = request.missing_inputs();
    if !missing.is_empty() {
        tracing::info!(?missing, "run is not ready");
        return Ok(RunOutcome::NotReady { missing });
    }

    // Resolve every template first so a missing one aborts before any merge.
    let mut planned = Vec::with_capacity(request.datasets.len());
    for dataset in &request.datasets {
        let template = resolve_template(request, dataset)?;
        let data = dataset
            .data
            .clone()
            .with_context(|| format!("{} data path is not set", dataset.kind))?;
        planned.push((dataset, template, data));
    }

    let mut processed = Vec::with_capacity(planned.len());
    for (dataset, template, data) in planned {
        processed.push(process_dataset(
            dataset,
            &template,
            &data,
            request.ingest,
            request.date,
        )?);
    }
    Ok(RunOutcome::Completed(processed))
}

fn resolve_template(request: &RunRequest, dataset: &DatasetRequest) -> Result<PathBuf> {
    match request.input_source {
        InputSource::Upload => dataset
            .template
            .clone()
            .with_context(|| format!("{} template path is not set", dataset.kind)),
        InputSource::Path => {
            let dir = request
                .template_dir
                .as_deref()
                .context("template directory is not set")?;
            let found = locate_template(dir, &dataset.template_glob)?;
            tracing::info!(
                dataset = %dataset.kind,
                template = %found.display(),
                "located template"
            );
            Ok(found)
        }
    }
}

/// Load `data` and merge it into the active sheet of the `template` workbook.
pub fn merge_into_template(
    template: &Path,
    data: &Path,
    mapping: FieldMapping,
    ingest: IngestOptions,
) -> Result<(Spreadsheet, MergeReport)> {
    let candidates = load_candidates(data, ingest)?;
    let mut book = open_template(template)?;
    let report = merge_rows(target_sheet_mut(&mut book), &candidates, mapping)?;
    Ok((book, report))
}

/// Merge one dataset into its template and name the result.
pub fn process_dataset(
    dataset: &DatasetRequest,
    template: &Path,
    data: &Path,
    ingest: IngestOptions,
    date: NaiveDate,
) -> Result<ProcessedWorkbook> {
    let (book, report) = merge_into_template(template, data, dataset.mapping, ingest)
        .with_context(|| format!("failed to merge {} data", dataset.kind))?;
    tracing::info!(
        dataset = %dataset.kind,
        appended = report.appended_count(),
        duplicates = report.duplicates.len(),
        skipped_empty_key = report.skipped_empty_key,
        "merged dataset"
    );

    Ok(ProcessedWorkbook {
        dataset: dataset.kind,
        file_name: output_file_name(&dataset.prefix, date),
        template: template.to_path_buf(),
        data: data.to_path_buf(),
        report,
        book,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn output_names_use_day_month_year() {
        assert_eq!(output_file_name("Profile", date()), "ProfileData_07032024.xlsx");
        assert_eq!(output_file_name("Audit", date()), "AuditData_07032024.xlsx");
    }

    #[test]
    fn upload_mode_needs_data_and_templates() {
        let request = RunRequest::from_settings(
            &MergeSettings::default(),
            DatasetPaths {
                data: Some(PathBuf::from("profile.csv")),
                template: None,
            },
            DatasetPaths::default(),
            date(),
        );
        assert_eq!(
            request.missing_inputs(),
            vec!["profile_template", "audit_data", "audit_template"]
        );
        let outcome = execute(&request).unwrap();
        assert!(matches!(outcome, RunOutcome::NotReady { missing } if missing.len() == 3));
    }

    #[test]
    fn path_mode_needs_only_data_and_directory() {
        let settings = MergeSettings {
            input_source: InputSource::Path,
            ..Default::default()
        };
        let request = RunRequest::from_settings(
            &settings,
            DatasetPaths {
                data: Some(PathBuf::from("profile.csv")),
                template: None,
            },
            DatasetPaths {
                data: Some(PathBuf::from("audit.xlsx")),
                template: None,
            },
            date(),
        );
        assert_eq!(request.missing_inputs(), vec!["template_dir"]);
    }

    #[test]
    fn dataset_defaults() {
        assert_eq!(DatasetKind::Profile.default_mapping(), FieldMapping::Positional);
        assert_eq!(DatasetKind::Audit.default_mapping(), FieldMapping::Header);
        assert_eq!(DatasetKind::Audit.as_ref(), "audit");
    }
}
