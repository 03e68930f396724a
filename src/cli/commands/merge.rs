use super::ReportSummary;
use crate::config::{MergeSettings, SettingsArgs};
use crate::errors::InvalidArgumentError;
use crate::ingest::{DataFormat, IngestOptions};
use crate::model::FieldMapping;
use crate::pipeline::merge_into_template;
use crate::workbook::{normalize_destination_path, normalize_existing_file, save_workbook};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug)]
pub struct MergeInputs {
    pub template: PathBuf,
    pub data: PathBuf,
    pub mapping: Option<FieldMapping>,
    pub csv_delimiter: Option<char>,
    pub dry_run: bool,
    pub in_place: bool,
    pub output: Option<PathBuf>,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum WriteMode {
    DryRun,
    InPlace,
    Output(PathBuf),
}

impl WriteMode {
    fn resolve(dry_run: bool, in_place: bool, output: Option<PathBuf>) -> Result<Self> {
        match (dry_run, in_place, output) {
            (true, false, None) => Ok(Self::DryRun),
            (false, true, None) => Ok(Self::InPlace),
            (false, false, Some(path)) => Ok(Self::Output(path)),
            _ => Err(InvalidArgumentError::new(
                "mode",
                "choose exactly one of --dry-run, --in-place, or --output <PATH>",
            )
            .into()),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::DryRun => "dry_run",
            Self::InPlace => "in_place",
            Self::Output(_) => "output",
        }
    }
}

#[derive(Debug, Serialize)]
struct MergeResponse {
    template: String,
    data: String,
    mapping: FieldMapping,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    written: Option<String>,
    report: ReportSummary,
}

pub async fn merge(config: Option<PathBuf>, inputs: MergeInputs) -> Result<Value> {
    let MergeInputs {
        template,
        data,
        mapping,
        csv_delimiter,
        dry_run,
        in_place,
        output,
        force,
    } = inputs;

    let mode = WriteMode::resolve(dry_run, in_place, output)?;
    let template = normalize_existing_file(&template)?;
    let data = normalize_existing_file(&data)?;

    let destination = match &mode {
        WriteMode::DryRun => None,
        WriteMode::InPlace => Some(template.clone()),
        WriteMode::Output(path) => {
            let path = normalize_destination_path(path)?;
            if path.exists() && !force && path != template {
                return Err(InvalidArgumentError::new(
                    "output",
                    format!(
                        "output '{}' already exists; pass --force to overwrite",
                        path.display()
                    ),
                )
                .into());
            }
            Some(path)
        }
    };

    let settings = MergeSettings::from_args(
        config.as_deref(),
        SettingsArgs {
            csv_delimiter,
            ..Default::default()
        },
    )?;
    let ingest = IngestOptions {
        csv_delimiter: settings.csv_delimiter,
    };
    let mapping = match mapping {
        Some(mapping) => mapping,
        None => match DataFormat::from_path(&data)? {
            DataFormat::Xlsx => FieldMapping::Header,
            DataFormat::Csv => FieldMapping::Positional,
        },
    };

    let response = tokio::task::spawn_blocking(move || -> Result<MergeResponse> {
        let (book, report) = merge_into_template(&template, &data, mapping, ingest)?;
        if let Some(dest) = &destination {
            save_workbook(&book, dest)?;
            tracing::info!(path = %dest.display(), appended = report.appended_count(), "wrote workbook");
        }
        Ok(MergeResponse {
            template: template.display().to_string(),
            data: data.display().to_string(),
            mapping,
            mode: mode.label(),
            written: destination.map(|dest| dest.display().to_string()),
            report: ReportSummary::from(&report),
        })
    })
    .await
    .context("merge task failed to complete")??;

    Ok(serde_json::to_value(response)?)
}
