use crate::errors::MergeError;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub fn normalize_existing_file(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if !absolute.exists() {
        bail!("file '{}' does not exist", absolute.display());
    }
    if !absolute.is_file() {
        bail!("path '{}' is not a file", absolute.display());
    }
    Ok(fs::canonicalize(&absolute).unwrap_or(absolute))
}

pub fn normalize_destination_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if let Some(parent) = absolute.parent()
        && !parent.exists()
    {
        bail!(
            "destination directory '{}' does not exist",
            parent.display()
        );
    }
    Ok(absolute)
}

/// Load a template workbook. Any parse failure is reported as unreadable input.
pub fn open_template(path: &Path) -> Result<Spreadsheet> {
    let book =
        umya_spreadsheet::reader::xlsx::read(path).map_err(|e| MergeError::unreadable(path, e))?;
    if book.get_sheet_count() == 0 {
        return Err(MergeError::unreadable(path, "workbook has no sheets").into());
    }
    Ok(book)
}

/// The sheet new rows are merged into: the workbook's active sheet.
pub fn target_sheet_mut(book: &mut Spreadsheet) -> &mut Worksheet {
    book.get_active_sheet_mut()
}

pub fn target_sheet(book: &Spreadsheet) -> &Worksheet {
    book.get_active_sheet()
}

/// Write `book` next to `dest` and rename it into place, so a failed write
/// never leaves a truncated workbook behind.
pub fn save_workbook(book: &Spreadsheet, dest: &Path) -> Result<()> {
    let dir = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .prefix(".template-merge-")
        .suffix(".xlsx")
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage output in '{}'", dir.display()))?;

    umya_spreadsheet::writer::xlsx::write(book, staged.path())
        .with_context(|| format!("failed to save workbook '{}'", dest.display()))?;
    staged
        .persist(dest)
        .with_context(|| format!("failed to move workbook into '{}'", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn saved_workbook_reopens_with_values() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ProfileData_01022024.xlsx");
        let mut book = umya_spreadsheet::new_file();
        target_sheet_mut(&mut book)
            .get_cell_mut("A1")
            .set_value("ID");

        save_workbook(&book, &dest).unwrap();

        let reopened = open_template(&dest).unwrap();
        let value = target_sheet(&reopened).get_value("A1");
        assert_eq!(value, "ID");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn garbage_template_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Profile Template.xlsx");
        fs::write(&path, b"not a zip archive").unwrap();

        let err = open_template(&path).unwrap_err();
        assert_matches!(
            err.downcast_ref::<MergeError>(),
            Some(MergeError::InputUnreadable { .. })
        );
    }

    #[test]
    fn destination_parent_must_exist() {
        let err = normalize_destination_path(Path::new("/nonexistent/dir/out.xlsx")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
