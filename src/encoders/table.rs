use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::EncodingError;
use crate::telemetry::{to_json, DocumentOptions, Value};

/// Rectangular data with named columns, written as CSV.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Width is checked when the table is encoded.
    pub fn push_row<V: Into<Value>>(&mut self, row: impl IntoIterator<Item = V>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn with_row<V: Into<Value>>(mut self, row: impl IntoIterator<Item = V>) -> Self {
        self.push_row(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn encode(table: &Table, index: bool, destination: &Path) -> Result<(), EncodingError> {
    if table.columns.is_empty() {
        return Err(EncodingError::Unsupported("table has no columns".to_string()));
    }
    if let Some((i, row)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != table.columns.len())
    {
        return Err(EncodingError::Unsupported(format!(
            "table row {} has {} cells, expected {}",
            i,
            row.len(),
            table.columns.len()
        )));
    }

    let file = File::create(destination).map_err(|e| EncodingError::io(destination, e))?;
    let mut out = BufWriter::new(file);
    let write_err = |e| EncodingError::io(destination, e);

    let mut header: Vec<String> = Vec::with_capacity(table.columns.len() + 1);
    if index {
        header.push(String::new());
    }
    header.extend(table.columns.iter().map(|c| quote(c)));
    writeln!(out, "{}", header.join(",")).map_err(write_err)?;

    for (i, row) in table.rows.iter().enumerate() {
        let mut line: Vec<String> = Vec::with_capacity(row.len() + 1);
        if index {
            line.push(i.to_string());
        }
        line.extend(row.iter().map(|cell| quote(&render_cell(cell))));
        writeln!(out, "{}", line.join(",")).map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

fn render_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Opaque(opaque) => opaque.placeholder(),
        nested => to_json(nested, &DocumentOptions::default()).to_string(),
    }
}

// RFC 4180 quoting
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
