use serde::Deserialize;
use std::path::PathBuf;

/// Settings for one recorder tree. Only `output_dir` is required in practice;
/// everything else has a default that keeps documents minimal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Root output directory, resolved against the working directory when relative.
    pub output_dir: PathBuf,
    /// File stem of the final document written by the root scope.
    pub document_name: String,
    /// Remove the output directory when the root scope opens.
    pub clear_dir: bool,
    /// Record `start`, `end` and `dt` for each scope and `dt` for wrapped calls.
    pub record_timing: bool,
    /// Sequences longer than this are summarised in the document as `len:<n>`.
    pub inline_sequence_limit: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("logs"),
            document_name: "telemetry".to_string(),
            clear_dir: false,
            record_timing: false,
            inline_sequence_limit: None,
        }
    }
}

impl LoggerConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    pub fn with_clear_dir(mut self, clear: bool) -> Self {
        self.clear_dir = clear;
        self
    }

    pub fn with_timing(mut self, record: bool) -> Self {
        self.record_timing = record;
        self
    }

    pub fn with_inline_sequence_limit(mut self, limit: usize) -> Self {
        self.inline_sequence_limit = Some(limit);
        self
    }

    /// Path of the document the root scope writes on disposal.
    pub fn document_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.document_name))
    }
}
