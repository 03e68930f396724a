use crate::pipeline::{DatasetKind, ProcessedWorkbook};
use crate::workbook::save_workbook;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct WrittenWorkbook {
    pub dataset: DatasetKind,
    pub path: PathBuf,
}

/// Persist every processed workbook into `output_dir`, creating it if needed.
pub fn write_outputs(
    workbooks: &[ProcessedWorkbook],
    output_dir: &Path,
) -> Result<Vec<WrittenWorkbook>> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            output_dir.display()
        )
    })?;

    let mut written = Vec::with_capacity(workbooks.len());
    for workbook in workbooks {
        let path = output_dir.join(&workbook.file_name);
        save_workbook(&workbook.book, &path)?;
        tracing::info!(dataset = %workbook.dataset, path = %path.display(), "wrote workbook");
        written.push(WrittenWorkbook {
            dataset: workbook.dataset,
            path,
        });
    }
    Ok(written)
}
