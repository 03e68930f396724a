use crate::sheet::{data_row_count, detect_formula_columns, existing_keys, header_map};
use crate::workbook::{normalize_existing_file, open_template, target_sheet};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use umya_spreadsheet::helper::coordinate::string_from_column_index;

#[derive(Debug, Serialize)]
struct InspectResponse {
    template: String,
    sheet: String,
    headers: Vec<HeaderEntry>,
    formula_columns: Vec<String>,
    data_rows: u32,
    distinct_keys: usize,
}

#[derive(Debug, Serialize)]
struct HeaderEntry {
    column: String,
    index: u32,
    name: String,
}

pub async fn inspect(template: PathBuf) -> Result<Value> {
    let template = normalize_existing_file(&template)?;
    let response = tokio::task::spawn_blocking(move || -> Result<InspectResponse> {
        let book = open_template(&template)?;
        let sheet = target_sheet(&book);
        let headers = header_map(sheet)
            .into_iter()
            .map(|(name, index)| HeaderEntry {
                column: string_from_column_index(&index),
                index,
                name,
            })
            .collect();
        Ok(InspectResponse {
            template: template.display().to_string(),
            sheet: sheet.get_name().to_string(),
            headers,
            formula_columns: detect_formula_columns(sheet)
                .into_iter()
                .map(|col| string_from_column_index(&col))
                .collect(),
            data_rows: data_row_count(sheet),
            distinct_keys: existing_keys(sheet).len(),
        })
    })
    .await
    .context("inspect task failed to complete")??;

    Ok(serde_json::to_value(response)?)
}
