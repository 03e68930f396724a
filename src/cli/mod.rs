pub mod commands;
pub mod errors;
pub mod output;

use crate::config::SettingsArgs;
use crate::model::FieldMapping;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "template-merge",
    version,
    about = "Merge uploaded profile and audit records into xlsx templates",
    long_about = "Merge uploaded profile and audit records into xlsx templates.\n\nRows whose key (first column) already exists in the template are skipped. Appended rows inherit formatting and shifted formulas from the row above.\n\nCommon workflows:\n  • Full run: run --profile-data p.csv --audit-data a.xlsx --template-dir templates/\n  • One dataset: merge template.xlsx data.csv --output merged.xlsx\n  • Look before merging: inspect template.xlsx"
)]
pub struct Cli {
    #[arg(
        long,
        env = "TEMPLATE_MERGE_CONFIG",
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Emit compact JSON without pretty-printing"
    )]
    pub compact: bool,

    #[arg(long, global = true, help = "Only log errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(
        about = "Merge profile and audit data into their templates and write dated outputs",
        after_long_help = "Examples:\n  template-merge run --profile-data profile.csv --audit-data audit.xlsx --profile-template 'Profile Template.xlsx' --audit-template 'Audit Template.xlsx'\n  template-merge run --profile-data profile.csv --audit-data audit.xlsx --template-dir templates/ --output-dir out/\n\nWhen an input is missing the command reports status not_ready and exits 0 without merging."
    )]
    Run {
        #[arg(long, value_name = "FILE", help = "Profile data (.csv)")]
        profile_data: Option<PathBuf>,
        #[arg(long, value_name = "FILE", help = "Audit data (.xlsx)")]
        audit_data: Option<PathBuf>,
        #[arg(long, value_name = "FILE", help = "Profile template (upload mode)")]
        profile_template: Option<PathBuf>,
        #[arg(long, value_name = "FILE", help = "Audit template (upload mode)")]
        audit_template: Option<PathBuf>,
        #[arg(
            long,
            value_name = "DDMMYYYY",
            help = "Date used in output file names (default: today)"
        )]
        date: Option<String>,
        #[arg(long, help = "Merge and report without writing output files")]
        dry_run: bool,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    #[command(
        about = "Merge one data file into one template",
        after_long_help = "Examples:\n  template-merge merge 'Profile Template.xlsx' profile.csv --dry-run\n  template-merge merge 'Audit Template.xlsx' audit.xlsx --output merged.xlsx --force\n\nMode selection:\n  Choose exactly one of --dry-run, --in-place, or --output <PATH>."
    )]
    Merge {
        #[arg(value_name = "TEMPLATE", help = "Template workbook (.xlsx)")]
        template: PathBuf,
        #[arg(value_name = "DATA", help = "Data file (.csv or .xlsx)")]
        data: PathBuf,
        #[arg(
            long,
            value_enum,
            help = "Field mapping (default: header for .xlsx data, positional for .csv)"
        )]
        mapping: Option<FieldMapping>,
        #[arg(
            long,
            env = "TEMPLATE_MERGE_CSV_DELIMITER",
            value_name = "CHAR",
            help = "Field delimiter of CSV data"
        )]
        csv_delimiter: Option<char>,
        #[arg(long, help = "Merge and report without writing")]
        dry_run: bool,
        #[arg(long, help = "Write the merged workbook over the template")]
        in_place: bool,
        #[arg(long, value_name = "PATH", help = "Write the merged workbook here")]
        output: Option<PathBuf>,
        #[arg(long, help = "Allow overwriting --output when it already exists")]
        force: bool,
    },
    #[command(about = "Show headers, formula columns and row counts of a template")]
    Inspect {
        #[arg(value_name = "TEMPLATE", help = "Template workbook (.xlsx)")]
        template: PathBuf,
    },
}

pub async fn run_command(cli: Cli) -> Result<Value> {
    let Cli {
        config, command, ..
    } = cli;
    match command {
        Commands::Run {
            profile_data,
            audit_data,
            profile_template,
            audit_template,
            date,
            dry_run,
            settings,
        } => {
            commands::run::run(
                config,
                commands::run::RunInputs {
                    profile_data,
                    audit_data,
                    profile_template,
                    audit_template,
                    date,
                    dry_run,
                },
                settings,
            )
            .await
        }
        Commands::Merge {
            template,
            data,
            mapping,
            csv_delimiter,
            dry_run,
            in_place,
            output,
            force,
        } => {
            commands::merge::merge(
                config,
                commands::merge::MergeInputs {
                    template,
                    data,
                    mapping,
                    csv_delimiter,
                    dry_run,
                    in_place,
                    output,
                    force,
                },
            )
            .await
        }
        Commands::Inspect { template } => commands::inspect::inspect(template).await,
    }
}
