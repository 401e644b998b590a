use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::encoders::EncodingError;

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Every failure a scope operation can surface to its caller.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("output directory {} is unusable: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{name}` is not a valid scope name: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("scope `{parent}` already has an active child named `{name}`")]
    DuplicateName { parent: String, name: String },

    #[error("scope `{scope}` is disposed, cannot {operation}")]
    State {
        scope: String,
        operation: &'static str,
    },

    #[error("scope `{scope}` was disposed while children were still active: {children:?}")]
    DanglingChild { scope: String, children: Vec<String> },

    #[error("scope `{scope}` could not be merged into its parent: {reason}")]
    Merge { scope: String, reason: String },

    #[error("artifact `{name}` could not be saved")]
    Encoding {
        name: String,
        #[source]
        source: EncodingError,
    },

    #[error("telemetry document {} could not be written", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TelemetryError {
    pub(crate) fn state(scope: &str, operation: &'static str) -> Self {
        TelemetryError::State {
            scope: scope.to_string(),
            operation,
        }
    }
}
