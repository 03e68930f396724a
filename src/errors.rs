use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a merge. Anything else travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("input file '{}' could not be read: {reason}", path.display())]
    InputUnreadable { path: PathBuf, reason: String },

    #[error("no template matching '{pattern}' found in '{}'", dir.display())]
    TemplateNotFound { dir: PathBuf, pattern: String },

    #[error("template sheet '{sheet}' has no header row")]
    MissingHeader { sheet: String },
}

impl MergeError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InputUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MergeError::InputUnreadable { .. } | MergeError::MissingHeader { .. } => {
                "INPUT_UNREADABLE"
            }
            MergeError::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidArgumentError {
    argument: &'static str,
    message: String,
}

impl InvalidArgumentError {
    pub fn new(argument: &'static str, message: impl Into<String>) -> Self {
        Self {
            argument,
            message: message.into(),
        }
    }

    pub fn argument(&self) -> &'static str {
        self.argument
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
