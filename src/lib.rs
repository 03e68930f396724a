//! Merge uploaded profile and audit records into xlsx templates.
//!
//! Candidate rows whose key (first column) is already present in the
//! template are skipped; every other row is appended below the existing data
//! and inherits formatting and row-shifted formulas from the row above it.

pub mod cli;
pub mod cloner;
pub mod config;
pub mod errors;
pub mod formula;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod repository;
pub mod sheet;
pub mod sink;
pub mod styles;
pub mod utils;
pub mod workbook;

pub use config::{InputSource, MergeSettings};
pub use errors::MergeError;
pub use merge::merge_rows;
pub use model::{CandidateRow, CellValue, FieldMapping, MergeReport};
pub use pipeline::{RunOutcome, RunRequest, execute};
