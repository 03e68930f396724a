#![allow(dead_code)]
use std::path::{Path, PathBuf};
use umya_spreadsheet::{PatternValues, Spreadsheet, Worksheet};

#[derive(Clone, Debug)]
pub enum CellVal {
    Text(String),
    Num(f64),
    Formula(String),
    Empty,
}

impl From<&str> for CellVal {
    fn from(s: &str) -> Self {
        CellVal::Text(s.to_string())
    }
}

impl From<f64> for CellVal {
    fn from(n: f64) -> Self {
        CellVal::Num(n)
    }
}

impl From<i32> for CellVal {
    fn from(n: i32) -> Self {
        CellVal::Num(n as f64)
    }
}

pub fn formula(text: &str) -> CellVal {
    CellVal::Formula(text.to_string())
}

fn set_cell(sheet: &mut Worksheet, col: u32, row: u32, val: &CellVal) {
    match val {
        CellVal::Text(s) => {
            sheet.get_cell_mut((col, row)).set_value_string(s.clone());
        }
        CellVal::Num(n) => {
            sheet.get_cell_mut((col, row)).set_value_number(*n);
        }
        CellVal::Formula(f) => {
            sheet.get_cell_mut((col, row)).set_formula(f.clone());
        }
        CellVal::Empty => {}
    }
}

/// Header row at row 1, data from row 2.
pub fn fill_table(sheet: &mut Worksheet, headers: &[&str], rows: &[Vec<CellVal>]) {
    for (i, header) in headers.iter().enumerate() {
        sheet
            .get_cell_mut((i as u32 + 1, 1))
            .set_value_string(header.to_string());
    }
    for (row_idx, row_data) in rows.iter().enumerate() {
        let row = 2 + row_idx as u32;
        for (col_idx, val) in row_data.iter().enumerate() {
            set_cell(sheet, col_idx as u32 + 1, row, val);
        }
    }
}

/// Bold font on column A, solid fill on column B and a thin bottom border
/// on column C of `row`.
pub fn style_row(sheet: &mut Worksheet, row: u32) {
    sheet.get_style_mut((1, row)).get_font_mut().set_bold(true);
    sheet
        .get_style_mut((2, row))
        .get_fill_mut()
        .get_pattern_fill_mut()
        .set_pattern_type(PatternValues::Solid)
        .get_foreground_color_mut()
        .set_argb("FFFFFF00");
    sheet
        .get_style_mut((3, row))
        .get_borders_mut()
        .get_bottom_border_mut()
        .set_border_style("thin");
}

pub fn write_book(book: &Spreadsheet, path: &Path) {
    umya_spreadsheet::writer::xlsx::write(book, path).expect("write workbook");
}

pub fn read_book(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read workbook")
}

/// ID | Name | Amount | Total(=C*2), two data rows, the last one styled.
pub fn write_profile_template(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("default sheet");
    fill_table(
        sheet,
        &["ID", "Name", "Amount", "Total"],
        &[
            vec![101.into(), "Ann".into(), 10.into(), formula("C2*2")],
            vec![102.into(), "Bob".into(), 20.into(), formula("C3*2")],
        ],
    );
    style_row(sheet, 3);
    write_book(&book, path);
}

/// Audit ID | Score | Flag(formula) | Auditor, one data row.
pub fn write_audit_template(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("default sheet");
    fill_table(
        sheet,
        &["Audit ID", "Score", "Flag", "Auditor"],
        &[vec![
            "AU-1".into(),
            7.into(),
            formula("IF(B2>5,\"Y\",\"N\")"),
            "Zoe".into(),
        ]],
    );
    write_book(&book, path);
}

/// Columns in a different order than the template, including a value for the
/// template's formula column.
pub fn write_audit_data(path: &Path) {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("default sheet");
    fill_table(
        sheet,
        &["Audit ID", "Auditor", "Score", "Flag"],
        &[
            vec!["AU-1".into(), "Zoe".into(), 7.into(), "Y".into()],
            vec!["AU-2".into(), "Yan".into(), 3.into(), "override".into()],
            vec![CellVal::Empty, "Nobody".into(), 1.into(), CellVal::Empty],
            vec!["AU-3".into(), "Xia".into(), 9.into(), CellVal::Empty],
        ],
    );
    write_book(&book, path);
}

pub const PROFILE_CSV: &str = "ID,Name,Amount\n101,Ann,10\n103,Cid,30\n,Nobody,1\n104,Dee,40\n";

pub fn write_profile_data(path: &Path) {
    std::fs::write(path, PROFILE_CSV).expect("write csv");
}

pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    /// Templates under `templates/`, data files at the root, empty `out/`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("templates")).expect("templates dir");
        std::fs::create_dir(dir.path().join("out")).expect("out dir");
        write_profile_template(&dir.path().join("templates/Profile Data Template.xlsx"));
        write_audit_template(&dir.path().join("templates/Audit Data Template.xlsx"));
        write_profile_data(&dir.path().join("profile.csv"));
        write_audit_data(&dir.path().join("audit.xlsx"));
        Self { dir }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn path_str(&self, relative: &str) -> String {
        self.path(relative).to_string_lossy().to_string()
    }

    pub fn out_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path("out"))
            .expect("read out dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

pub fn cell_text(sheet: &Worksheet, address: &str) -> String {
    sheet
        .get_cell(address)
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}
