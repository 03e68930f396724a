use crate::errors::{InvalidArgumentError, MergeError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_this: Option<String>,
}

pub fn envelope_for(error: &anyhow::Error) -> ErrorEnvelope {
    for cause in error.chain() {
        if let Some(merge) = cause.downcast_ref::<MergeError>() {
            return merge_envelope(merge);
        }
        if let Some(invalid) = cause.downcast_ref::<InvalidArgumentError>() {
            return ErrorEnvelope {
                code: "INVALID_ARGUMENT".to_string(),
                message: invalid.message().to_string(),
                try_this: argument_hint(invalid.argument()).map(str::to_string),
            };
        }
    }

    let message = format!("{error:#}");

    if is_config_failure(&message) {
        return ErrorEnvelope {
            code: "CONFIG_INVALID".to_string(),
            message,
            try_this: Some(
                "check the --config file (YAML or JSON) for unknown keys or bad values"
                    .to_string(),
            ),
        };
    }

    if message.contains("does not exist") {
        return ErrorEnvelope {
            code: "FILE_NOT_FOUND".to_string(),
            message,
            try_this: Some("check the workbook path and permissions".to_string()),
        };
    }

    ErrorEnvelope {
        code: "COMMAND_FAILED".to_string(),
        message,
        try_this: None,
    }
}

fn merge_envelope(error: &MergeError) -> ErrorEnvelope {
    let try_this = match error {
        MergeError::InputUnreadable { .. } => {
            "make sure the file is a valid .csv or .xlsx and is not open in another program"
        }
        MergeError::MissingHeader { .. } => "add a header row to the template's first sheet",
        MergeError::TemplateNotFound { .. } => {
            "check --template-dir or adjust --profile-template-glob / --audit-template-glob"
        }
    };
    ErrorEnvelope {
        code: error.code().to_string(),
        message: error.to_string(),
        try_this: Some(try_this.to_string()),
    }
}

fn argument_hint(argument: &str) -> Option<&'static str> {
    match argument {
        "mode" => Some("pass one of --dry-run, --in-place, or --output <PATH>"),
        "output" => Some("pass --force or choose another --output path"),
        "date" => Some("pass the date as DDMMYYYY, for example 07032024"),
        "csv_delimiter" => Some("use a single ASCII character such as ',' or ';'"),
        _ => None,
    }
}

fn is_config_failure(message: &str) -> bool {
    message.contains("config file")
        || message.contains("YAML config")
        || message.contains("JSON config")
        || message.contains("unsupported config extension")
}
