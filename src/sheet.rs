use crate::formula::is_formula_text;
use crate::model::CellValue;
use crate::utils::{format_excel_date, format_number, is_date_format};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};
use umya_spreadsheet::{Cell, NumberingFormat, Worksheet};

pub const HEADER_ROW: u32 = 1;
pub const FIRST_DATA_ROW: u32 = 2;

/// Formula text of a cell including the leading `=`, if the cell holds one.
/// Literal strings that start with `=` count as formulas too.
pub fn formula_text(cell: &Cell) -> Option<String> {
    if cell.is_formula() {
        let formula = cell.get_formula();
        return Some(if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={formula}")
        });
    }
    let value = cell.get_value();
    if is_formula_text(&value) {
        Some(value.to_string())
    } else {
        None
    }
}

/// Stringified cell value for key comparison, `None` when blank.
/// Numbers under a date format render as ISO dates, same as ingested dates.
pub fn key_text(cell: &Cell) -> Option<String> {
    if let Some(number) = cell.get_value_number() {
        let dated = cell
            .get_style()
            .get_number_format()
            .is_some_and(|format| is_date_format(format.get_format_code()));
        return Some(if dated {
            format_excel_date(number)
        } else {
            format_number(number)
        });
    }
    let value = cell.get_value();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Header text → 1-based column. A repeated header maps to its right-most column.
pub fn header_map(sheet: &Worksheet) -> IndexMap<String, u32> {
    let mut headers = IndexMap::new();
    for col in 1..=sheet.get_highest_column() {
        let Some(cell) = sheet.get_cell((col, HEADER_ROW)) else {
            continue;
        };
        let name = cell.get_value();
        if name.is_empty() {
            continue;
        }
        headers.insert(name.to_string(), col);
    }
    headers
}

/// Column-1 keys of every data row present right now.
pub fn existing_keys(sheet: &Worksheet) -> HashSet<String> {
    let mut keys = HashSet::new();
    for row in FIRST_DATA_ROW..=sheet.get_highest_row() {
        if let Some(key) = sheet.get_cell((1, row)).and_then(key_text) {
            keys.insert(key);
        }
    }
    keys
}

/// Columns whose first data row holds a formula. Only row 2 is inspected.
pub fn detect_formula_columns(sheet: &Worksheet) -> BTreeSet<u32> {
    let mut columns = BTreeSet::new();
    if sheet.get_highest_row() < FIRST_DATA_ROW {
        return columns;
    }
    for col in 1..=sheet.get_highest_column() {
        let is_formula = sheet
            .get_cell((col, FIRST_DATA_ROW))
            .and_then(formula_text)
            .is_some();
        if is_formula {
            columns.insert(col);
        }
    }
    columns
}

pub fn data_row_count(sheet: &Worksheet) -> u32 {
    sheet.get_highest_row().saturating_sub(HEADER_ROW)
}

pub fn write_value(sheet: &mut Worksheet, col: u32, row: u32, value: &CellValue) {
    match value {
        CellValue::Empty => {}
        CellValue::Text(text) => {
            sheet.get_cell_mut((col, row)).set_value_string(text.clone());
        }
        CellValue::Number(number) => {
            sheet.get_cell_mut((col, row)).set_value_number(*number);
        }
        CellValue::Date { serial, format } => {
            sheet.get_cell_mut((col, row)).set_value_number(*serial);
            let code = if format.is_empty() {
                NumberingFormat::FORMAT_DATE_YYYYMMDD2.to_string()
            } else {
                format.clone()
            };
            sheet
                .get_style_mut((col, row))
                .get_number_format_mut()
                .set_format_code(code);
        }
    }
}
