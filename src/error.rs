use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop an upload from producing a snapshot.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("No valid data found in the file")]
    EmptyInput,

    #[error("Error processing data: Invalid format: row {index}: {reason}")]
    MalformedRow { index: usize, reason: String },

    #[error("Failed to parse delimited input: {0}")]
    Parse(#[from] csv::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error processing data: {0}")]
    Aborted(String),
}

/// A config-panel override that could not be turned into a [`crate::ConfigField`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigFieldError {
    #[error("unknown chart setting `{0}`")]
    UnknownField(String),

    #[error("invalid value `{value}` for `{field}`: {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("unknown column `{key}` for `{field}`; expected one of: {}", choices.join(", "))]
    UnknownColumn {
        field: &'static str,
        key: String,
        choices: Vec<String>,
    },
}
