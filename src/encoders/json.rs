use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::EncodingError;
use crate::telemetry::{to_json, DocumentOptions, Value};

/// Pretty JSON, rendered the same way as the telemetry document.
pub fn encode(value: &Value, destination: &Path) -> Result<(), EncodingError> {
    let file = File::create(destination).map_err(|e| EncodingError::io(destination, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &to_json(value, &DocumentOptions::default()))?;
    writer.flush().map_err(|e| EncodingError::io(destination, e))
}
