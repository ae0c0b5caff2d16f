use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessErrorCode {
    UnknownColumn,
    UnsupportedOperation,
    Internal,
}

/// Error surfaced by the data-processing service seam. Serializable so a
/// remote backend can carry it over the wire unchanged.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct ProcessError {
    pub code: ProcessErrorCode,
    pub message: String,
}

impl ProcessError {
    pub fn new(code: ProcessErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unknown_column(column: &str) -> Self {
        Self::new(
            ProcessErrorCode::UnknownColumn,
            format!("no such column: {column}"),
        )
    }
}
