//! Renders the root's merged entry tree into one JSON document.
//!
//! Rendering is total: anything JSON cannot hold becomes a placeholder string,
//! so only the final write can fail.

use serde_json::{Map, Number};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::value::{Mapping, Value};
use crate::config::LoggerConfig;
use crate::error::{Result, TelemetryError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    pub inline_sequence_limit: Option<usize>,
}

impl From<&LoggerConfig> for DocumentOptions {
    fn from(config: &LoggerConfig) -> Self {
        Self {
            inline_sequence_limit: config.inline_sequence_limit,
        }
    }
}

pub fn to_json(value: &Value, options: &DocumentOptions) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
        Value::Float(f) => match Number::from_f64(*f) {
            Some(n) => serde_json::Value::Number(n),
            // NaN and infinities have no JSON form
            None => serde_json::Value::String(f.to_string()),
        },
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => match options.inline_sequence_limit {
            Some(limit) if items.len() > limit => {
                serde_json::Value::String(format!("len:{}", items.len()))
            }
            _ => serde_json::Value::Array(items.iter().map(|v| to_json(v, options)).collect()),
        },
        Value::Mapping(map) => to_document(map, options),
        Value::Opaque(opaque) => serde_json::Value::String(opaque.placeholder()),
    }
}

pub fn to_document(entries: &Mapping, options: &DocumentOptions) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = entries
        .iter()
        .map(|(key, value)| (key.clone(), to_json(value, options)))
        .collect();
    serde_json::Value::Object(object)
}

/// Writes `document` as pretty JSON, creating the parent directory on demand.
pub fn write_document(path: &Path, document: &serde_json::Value) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| TelemetryError::Config {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let write = || -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, document).map_err(io::Error::from)?;
        writer.flush()
    };
    write().map_err(|source| TelemetryError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Telemetry document written to {}", path.display());
    Ok(())
}
