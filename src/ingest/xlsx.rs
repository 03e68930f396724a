use super::normalize_headers;
use crate::errors::MergeError;
use crate::model::{CandidateRow, CellValue};
use crate::sheet::{FIRST_DATA_ROW, HEADER_ROW};
use crate::utils::is_date_format;
use anyhow::Result;
use std::path::Path;
use umya_spreadsheet::{Cell, Worksheet};

/// Read the first sheet of an xlsx workbook as candidate rows keyed by the
/// header row.
pub fn read_candidates(path: &Path) -> Result<Vec<CandidateRow>> {
    let book =
        umya_spreadsheet::reader::xlsx::read(path).map_err(|e| MergeError::unreadable(path, e))?;
    let sheet = book
        .get_sheet(&0)
        .ok_or_else(|| MergeError::unreadable(path, "workbook has no sheets"))?;
    Ok(sheet_candidates(sheet))
}

pub fn sheet_candidates(sheet: &Worksheet) -> Vec<CandidateRow> {
    let width = sheet.get_highest_column();
    let headers = normalize_headers(
        (1..=width)
            .map(|col| {
                sheet
                    .get_cell((col, HEADER_ROW))
                    .map(|cell| cell.get_value().to_string())
                    .unwrap_or_default()
            })
            .collect(),
    );

    let mut rows = Vec::new();
    for row in FIRST_DATA_ROW..=sheet.get_highest_row() {
        let mut candidate = CandidateRow::new();
        for (offset, name) in headers.iter().enumerate() {
            let col = offset as u32 + 1;
            let value = sheet
                .get_cell((col, row))
                .map(cell_value)
                .unwrap_or_default();
            candidate.push(name.clone(), value);
        }
        if !candidate.is_blank() {
            rows.push(candidate);
        }
    }
    rows
}

fn cell_value(cell: &Cell) -> CellValue {
    if let Some(number) = cell.get_value_number() {
        let format = cell
            .get_style()
            .get_number_format()
            .map(|fmt| fmt.get_format_code().to_string())
            .unwrap_or_default();
        if is_date_format(&format) {
            return CellValue::Date {
                serial: number,
                format,
            };
        }
        return CellValue::Number(number);
    }
    CellValue::text(cell.get_value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use umya_spreadsheet::NumberingFormat;

    #[test]
    fn reads_typed_values_under_headers() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("Audit ID");
        sheet.get_cell_mut("B1").set_value("Score");
        sheet.get_cell_mut("C1").set_value("Date");
        sheet.get_cell_mut("A2").set_value_string("AU-1");
        sheet.get_cell_mut("B2").set_value_number(7.5);
        sheet.get_cell_mut("C2").set_value_number(45292);
        sheet
            .get_style_mut("C2")
            .get_number_format_mut()
            .set_format_code(NumberingFormat::FORMAT_DATE_YYYYMMDD2);
        sheet.get_cell_mut("A4").set_value_string("AU-2");

        let rows = sheet_candidates(sheet);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key().as_deref(), Some("AU-1"));
        assert_eq!(rows[0].fields[1].name, "Score");
        assert_eq!(rows[0].fields[1].value, CellValue::Number(7.5));
        assert!(matches!(rows[0].fields[2].value, CellValue::Date { serial, .. } if serial == 45292.0));
        assert_eq!(rows[1].fields[1].value, CellValue::Empty);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = read_candidates(Path::new("/nonexistent/audit.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MergeError>(),
            Some(MergeError::InputUnreadable { .. })
        ));
    }
}
