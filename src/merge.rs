use crate::cloner::clone_row;
use crate::errors::MergeError;
use crate::model::{AppendedRow, CandidateRow, FieldMapping, MergeReport};
use crate::sheet::{
    FIRST_DATA_ROW, detect_formula_columns, existing_keys, header_map, write_value,
};
use anyhow::Result;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use umya_spreadsheet::Worksheet;

/// Append every candidate whose key is not already in `sheet`.
///
/// Keys are checked against the rows present when the call starts; two new
/// candidates sharing a key are both appended. Candidates with an empty key
/// are dropped without error. Each appended row then inherits formatting and
/// shifted formulas from the row directly above it, unless that row is the
/// header.
pub fn merge_rows(
    sheet: &mut Worksheet,
    candidates: &[CandidateRow],
    mapping: FieldMapping,
) -> Result<MergeReport> {
    let highest_row = sheet.get_highest_row();
    if highest_row == 0 {
        return Err(MergeError::MissingHeader {
            sheet: sheet.get_name().to_string(),
        }
        .into());
    }

    let headers = header_map(sheet);
    let formula_columns = detect_formula_columns(sheet);
    let existing = existing_keys(sheet);

    let mut report = MergeReport {
        existing_rows: highest_row.saturating_sub(1),
        formula_columns: formula_columns.clone(),
        ..Default::default()
    };

    let mut next_row = highest_row + 1;
    for (index, candidate) in candidates.iter().enumerate() {
        let Some(key) = candidate.key() else {
            tracing::debug!(index, "skipping candidate with empty key");
            report.skipped_empty_key += 1;
            continue;
        };
        if existing.contains(&key) {
            tracing::debug!(index, key = %key, "skipping duplicate key");
            report.duplicates.push(key);
            continue;
        }

        write_candidate(
            sheet,
            candidate,
            next_row,
            mapping,
            &headers,
            &formula_columns,
        );

        let source_row = next_row - 1;
        if source_row >= FIRST_DATA_ROW {
            let cloned = clone_row(sheet, source_row, next_row);
            tracing::debug!(
                row = next_row,
                key = %key,
                styled = cloned.styled_cells,
                formulas = cloned.formulas,
                "appended row"
            );
        } else {
            tracing::warn!(
                row = next_row,
                "no data row above; appended without formatting or formulas"
            );
        }

        report.appended.push(AppendedRow { row: next_row, key });
        next_row += 1;
    }

    Ok(report)
}

fn write_candidate(
    sheet: &mut Worksheet,
    candidate: &CandidateRow,
    row: u32,
    mapping: FieldMapping,
    headers: &IndexMap<String, u32>,
    formula_columns: &BTreeSet<u32>,
) {
    match mapping {
        FieldMapping::Positional => {
            for (offset, field) in candidate.fields.iter().enumerate() {
                if field.value.is_empty() {
                    continue;
                }
                write_value(sheet, offset as u32 + 1, row, &field.value);
            }
        }
        FieldMapping::Header => {
            for field in &candidate.fields {
                if field.value.is_empty() {
                    continue;
                }
                let Some(&col) = headers.get(&field.name) else {
                    continue;
                };
                if formula_columns.contains(&col) {
                    continue;
                }
                write_value(sheet, col, row, &field.value);
            }
        }
    }
}
