use super::{is_missing_marker, normalize_headers};
use crate::errors::MergeError;
use crate::model::{CandidateRow, CellValue};
use anyhow::Result;
use std::io::Read;
use std::path::Path;

pub fn read_candidates(path: &Path, delimiter: u8) -> Result<Vec<CandidateRow>> {
    let content = read_file_as_utf8(path)?;
    parse_candidates(&content, delimiter)
        .map_err(|reason| MergeError::unreadable(path, reason).into())
}

/// UTF-8 first, falling back to Windows-1252 for spreadsheet-exported files.
fn read_file_as_utf8(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path).map_err(|e| MergeError::unreadable(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| MergeError::unreadable(path, e))?;

    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }
    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
    Ok(decoded.into_owned())
}

/// Parse delimited text with a header row. Columns whose every present value
/// is numeric become numbers; any other column keeps its values as text.
pub fn parse_candidates(
    content: &str,
    delimiter: u8,
) -> std::result::Result<Vec<CandidateRow>, String> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if headers.is_empty() {
        return Err("no header row".to_string());
    }
    let headers = normalize_headers(headers);

    let mut records: Vec<Vec<Option<String>>> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if record.len() > headers.len() {
            return Err(format!(
                "line {} has {} fields, header has {}",
                index + 2,
                record.len(),
                headers.len()
            ));
        }
        let mut fields: Vec<Option<String>> = record
            .iter()
            .map(|field| {
                if is_missing_marker(field) {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        fields.resize(headers.len(), None);
        if fields.iter().all(Option::is_none) {
            continue;
        }
        records.push(fields);
    }

    let numeric_columns: Vec<bool> = (0..headers.len())
        .map(|col| {
            records
                .iter()
                .filter_map(|fields| fields[col].as_deref())
                .all(|field| parse_number(field).is_some())
        })
        .collect();

    let rows = records
        .into_iter()
        .map(|fields| {
            let mut row = CandidateRow::new();
            for ((name, field), numeric) in headers.iter().zip(fields).zip(&numeric_columns) {
                let value = match field {
                    None => CellValue::Empty,
                    Some(text) if *numeric => parse_number(&text)
                        .map(CellValue::Number)
                        .unwrap_or(CellValue::Text(text)),
                    Some(text) => CellValue::text(text),
                };
                row.push(name.clone(), value);
            }
            row
        })
        .collect();
    Ok(rows)
}

fn parse_number(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    let looks_numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if trimmed.is_empty() || !looks_numeric {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
