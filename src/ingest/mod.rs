pub mod csv;
pub mod xlsx;

use crate::errors::MergeError;
use crate::model::CandidateRow;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Xlsx,
}

impl DataFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            other => Err(MergeError::unreadable(
                path,
                format!("unsupported data file extension '{other}' (expected csv or xlsx)"),
            )
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub csv_delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { csv_delimiter: b',' }
    }
}

pub fn load_candidates(path: &Path, options: IngestOptions) -> Result<Vec<CandidateRow>> {
    let rows = match DataFormat::from_path(path)? {
        DataFormat::Csv => self::csv::read_candidates(path, options.csv_delimiter)?,
        DataFormat::Xlsx => self::xlsx::read_candidates(path)?,
    };
    tracing::info!(path = %path.display(), rows = rows.len(), "loaded candidate rows");
    Ok(rows)
}

/// Markers a data-frame reader treats as missing values.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub(crate) fn is_missing_marker(field: &str) -> bool {
    MISSING_MARKERS.contains(&field)
}

/// Make header names unique: blanks become `Unnamed: <index>` and repeats
/// get a `.1`, `.2`, … suffix.
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(index, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {index}")
            } else {
                name
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base.clone()
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}
