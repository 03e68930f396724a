use super::ReportSummary;
use crate::config::{InputSource, MergeSettings, SettingsArgs};
use crate::errors::InvalidArgumentError;
use crate::pipeline::{DatasetKind, DatasetPaths, RunOutcome, RunRequest, execute};
use crate::sink::write_outputs;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct RunInputs {
    pub profile_data: Option<PathBuf>,
    pub audit_data: Option<PathBuf>,
    pub profile_template: Option<PathBuf>,
    pub audit_template: Option<PathBuf>,
    pub date: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RunResponse {
    NotReady {
        input_source: InputSource,
        missing: Vec<String>,
    },
    Completed {
        input_source: InputSource,
        dry_run: bool,
        outputs: Vec<DatasetOutput>,
    },
}

#[derive(Debug, Serialize)]
struct DatasetOutput {
    dataset: DatasetKind,
    file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    template: String,
    data: String,
    report: ReportSummary,
}

pub fn parse_run_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(chrono::Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%d%m%Y").map_err(|_| {
            InvalidArgumentError::new(
                "date",
                format!("invalid date '{raw}'; expected DDMMYYYY"),
            )
            .into()
        }),
    }
}

pub async fn run(config: Option<PathBuf>, inputs: RunInputs, args: SettingsArgs) -> Result<Value> {
    let settings = MergeSettings::from_args(config.as_deref(), args)?;
    let date = parse_run_date(inputs.date.as_deref())?;
    let request = RunRequest::from_settings(
        &settings,
        DatasetPaths {
            data: inputs.profile_data,
            template: inputs.profile_template,
        },
        DatasetPaths {
            data: inputs.audit_data,
            template: inputs.audit_template,
        },
        date,
    );
    let dry_run = inputs.dry_run;
    let input_source = settings.input_source;
    let output_dir = settings.output_dir;

    let response = tokio::task::spawn_blocking(move || -> Result<RunResponse> {
        let workbooks = match execute(&request)? {
            RunOutcome::NotReady { missing } => {
                return Ok(RunResponse::NotReady {
                    input_source,
                    missing,
                });
            }
            RunOutcome::Completed(workbooks) => workbooks,
        };

        let written = if dry_run {
            Vec::new()
        } else {
            write_outputs(&workbooks, &output_dir)?
        };

        let outputs = workbooks
            .iter()
            .map(|workbook| DatasetOutput {
                dataset: workbook.dataset,
                file_name: workbook.file_name.clone(),
                path: written
                    .iter()
                    .find(|entry| entry.dataset == workbook.dataset)
                    .map(|entry| entry.path.display().to_string()),
                template: workbook.template.display().to_string(),
                data: workbook.data.display().to_string(),
                report: ReportSummary::from(&workbook.report),
            })
            .collect();

        Ok(RunResponse::Completed {
            input_source,
            dry_run,
            outputs,
        })
    })
    .await
    .context("merge task failed to complete")??;

    Ok(serde_json::to_value(response)?)
}
