use crate::formula::shift_formula_rows;
use crate::sheet::formula_text;
use crate::styles::CellFormat;
use umya_spreadsheet::Worksheet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneSummary {
    pub styled_cells: u32,
    pub formulas: u32,
}

/// Carry formatting and formulas from `source_row` onto `target_row`, column
/// by column across the sheet's width. Formulas are written as text with
/// their row references moved by `target_row - source_row`; no value is
/// computed.
pub fn clone_row(sheet: &mut Worksheet, source_row: u32, target_row: u32) -> CloneSummary {
    let delta_row = i64::from(target_row) - i64::from(source_row);
    let mut summary = CloneSummary::default();

    for col in 1..=sheet.get_highest_column() {
        let Some(source) = sheet.get_cell((col, source_row)) else {
            continue;
        };
        let format = CellFormat::from_style(source.get_style());
        let formula = formula_text(source);

        if let Some(format) = format {
            format.apply_to(sheet.get_style_mut((col, target_row)));
            summary.styled_cells += 1;
        }

        if let Some(formula) = formula {
            let shifted = shift_formula_rows(&formula, delta_row);
            let body = shifted.strip_prefix('=').unwrap_or(&shifted).to_string();
            let cell = sheet.get_cell_mut((col, target_row));
            cell.set_formula(body);
            cell.get_cell_value_mut()
                .set_formula_result_default(String::new());
            summary.formulas += 1;
        }
    }

    summary
}
