use crate::errors::InvalidArgumentError;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::Display;

pub const DEFAULT_PROFILE_TEMPLATE_GLOB: &str = "*Profile*Template*.xlsx";
pub const DEFAULT_AUDIT_TEMPLATE_GLOB: &str = "*Audit*Template*.xlsx";
pub const DEFAULT_PROFILE_PREFIX: &str = "Profile";
pub const DEFAULT_AUDIT_PREFIX: &str = "Audit";
const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_CSV_DELIMITER: char = ',';

/// Where template workbooks come from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputSource {
    /// Template paths are given explicitly, one per dataset.
    #[default]
    Upload,
    /// Templates are picked from a directory by file-name pattern.
    #[value(alias = "dir")]
    Path,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    pub input_source: InputSource,
    pub template_dir: Option<PathBuf>,
    pub profile_template_glob: String,
    pub audit_template_glob: String,
    pub output_dir: PathBuf,
    pub profile_prefix: String,
    pub audit_prefix: String,
    pub csv_delimiter: u8,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            input_source: InputSource::default(),
            template_dir: None,
            profile_template_glob: DEFAULT_PROFILE_TEMPLATE_GLOB.to_string(),
            audit_template_glob: DEFAULT_AUDIT_TEMPLATE_GLOB.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            profile_prefix: DEFAULT_PROFILE_PREFIX.to_string(),
            audit_prefix: DEFAULT_AUDIT_PREFIX.to_string(),
            csv_delimiter: DEFAULT_CSV_DELIMITER as u8,
        }
    }
}

impl MergeSettings {
    /// Resolve settings with precedence CLI/env > config file > defaults.
    pub fn from_args(config: Option<&Path>, args: SettingsArgs) -> Result<Self> {
        let SettingsArgs {
            input_source: cli_input_source,
            template_dir: cli_template_dir,
            profile_template_glob: cli_profile_template_glob,
            audit_template_glob: cli_audit_template_glob,
            output_dir: cli_output_dir,
            profile_prefix: cli_profile_prefix,
            audit_prefix: cli_audit_prefix,
            csv_delimiter: cli_csv_delimiter,
        } = args;

        let file_config = if let Some(path) = config {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            input_source: file_input_source,
            template_dir: file_template_dir,
            profile_template_glob: file_profile_template_glob,
            audit_template_glob: file_audit_template_glob,
            output_dir: file_output_dir,
            profile_prefix: file_profile_prefix,
            audit_prefix: file_audit_prefix,
            csv_delimiter: file_csv_delimiter,
        } = file_config;

        let template_dir = cli_template_dir.or(file_template_dir);
        // A template directory on its own implies path mode.
        let input_source = cli_input_source
            .or(file_input_source)
            .unwrap_or(if template_dir.is_some() {
                InputSource::Path
            } else {
                InputSource::Upload
            });

        let csv_delimiter = cli_csv_delimiter
            .or(file_csv_delimiter)
            .unwrap_or(DEFAULT_CSV_DELIMITER);
        if !csv_delimiter.is_ascii() {
            return Err(InvalidArgumentError::new(
                "csv_delimiter",
                format!("csv delimiter '{csv_delimiter}' must be a single ASCII character"),
            )
            .into());
        }

        Ok(Self {
            input_source,
            template_dir,
            profile_template_glob: cli_profile_template_glob
                .or(file_profile_template_glob)
                .unwrap_or_else(|| DEFAULT_PROFILE_TEMPLATE_GLOB.to_string()),
            audit_template_glob: cli_audit_template_glob
                .or(file_audit_template_glob)
                .unwrap_or_else(|| DEFAULT_AUDIT_TEMPLATE_GLOB.to_string()),
            output_dir: cli_output_dir
                .or(file_output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            profile_prefix: cli_profile_prefix
                .or(file_profile_prefix)
                .unwrap_or_else(|| DEFAULT_PROFILE_PREFIX.to_string()),
            audit_prefix: cli_audit_prefix
                .or(file_audit_prefix)
                .unwrap_or_else(|| DEFAULT_AUDIT_PREFIX.to_string()),
            csv_delimiter: csv_delimiter as u8,
        })
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(
        long,
        env = "TEMPLATE_MERGE_INPUT_SOURCE",
        value_enum,
        help = "Where templates come from: explicit paths (upload) or a template directory (path)"
    )]
    pub input_source: Option<InputSource>,

    #[arg(
        long,
        env = "TEMPLATE_MERGE_TEMPLATE_DIR",
        value_name = "DIR",
        help = "Directory searched for templates in path mode"
    )]
    pub template_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "TEMPLATE_MERGE_PROFILE_TEMPLATE_GLOB",
        value_name = "GLOB",
        help = "File-name pattern of the profile template (default: *Profile*Template*.xlsx)"
    )]
    pub profile_template_glob: Option<String>,

    #[arg(
        long,
        env = "TEMPLATE_MERGE_AUDIT_TEMPLATE_GLOB",
        value_name = "GLOB",
        help = "File-name pattern of the audit template (default: *Audit*Template*.xlsx)"
    )]
    pub audit_template_glob: Option<String>,

    #[arg(
        long,
        env = "TEMPLATE_MERGE_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory the merged workbooks are written to (default: .)"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long, env = "TEMPLATE_MERGE_PROFILE_PREFIX", value_name = "PREFIX")]
    pub profile_prefix: Option<String>,

    #[arg(long, env = "TEMPLATE_MERGE_AUDIT_PREFIX", value_name = "PREFIX")]
    pub audit_prefix: Option<String>,

    #[arg(
        long,
        env = "TEMPLATE_MERGE_CSV_DELIMITER",
        value_name = "CHAR",
        help = "Field delimiter of CSV data files (default: ,)"
    )]
    pub csv_delimiter: Option<char>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    input_source: Option<InputSource>,
    template_dir: Option<PathBuf>,
    profile_template_glob: Option<String>,
    audit_template_glob: Option<String>,
    output_dir: Option<PathBuf>,
    profile_prefix: Option<String>,
    audit_prefix: Option<String>,
    csv_delimiter: Option<char>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
