use crate::utils::{format_excel_date, format_number};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single value read from uploaded data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    /// Excel serial date plus the number format it was read with.
    Date { serial: f64, format: String },
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::Date { serial, .. } => serial.is_nan(),
        }
    }

    /// Stringified form used for key comparison; `None` when the value is empty.
    pub fn key_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) => Some(text.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Date { serial, .. } => Some(format_excel_date(*serial)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateField {
    pub name: String,
    pub value: CellValue,
}

/// One row of uploaded data. Field order is the positional column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateRow {
    pub fields: Vec<CandidateField>,
}

impl CandidateRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: CellValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: CellValue) {
        self.fields.push(CandidateField {
            name: name.into(),
            value,
        });
    }

    pub fn key(&self) -> Option<String> {
        self.fields.first().and_then(|field| field.value.key_text())
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|field| field.value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMapping {
    /// Candidate column i lands in template column i.
    Positional,
    /// Candidate columns land under the template header with the same name.
    #[value(alias = "by-header", alias = "by_header")]
    #[serde(alias = "by_header")]
    Header,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppendedRow {
    pub row: u32,
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub existing_rows: u32,
    pub appended: Vec<AppendedRow>,
    pub duplicates: Vec<String>,
    pub skipped_empty_key: usize,
    pub formula_columns: BTreeSet<u32>,
}

impl MergeReport {
    pub fn appended_count(&self) -> usize {
        self.appended.len()
    }

    pub fn first_appended_row(&self) -> Option<u32> {
        self.appended.first().map(|row| row.row)
    }

    pub fn last_appended_row(&self) -> Option<u32> {
        self.appended.last().map(|row| row.row)
    }
}
