// src/ingest/sources.rs
//! Upload transports: CSV bytes and JSON records into a [`Table`].

use serde_json::Value;
use std::io::Read;

use super::{Cell, Table};
use crate::error::ValidationError;

/// Parse a CSV upload. The first record is the header; empty fields are `Missing`.
/// Short rows are padded with `Missing`; rows wider than the header are rejected.
pub fn table_from_csv<R: Read>(reader: R) -> Result<Table, ValidationError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()
        .map_err(malformed)?
        .iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();
    let mut table = Table::new(columns);

    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(malformed)?;
        if record.len() > width {
            return Err(ValidationError::MalformedUpload(format!(
                "row {}: expected at most {width} fields, saw {}",
                i + 1,
                record.len()
            )));
        }
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

/// Parse a JSON array of objects. Columns are the union of keys across records.
pub fn table_from_json(value: Value) -> Result<Table, ValidationError> {
    let Value::Array(items) = value else {
        return Err(ValidationError::MalformedUpload(
            "expected a JSON array of records".into(),
        ));
    };

    let mut objects = Vec::with_capacity(items.len());
    let mut columns: Vec<String> = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else {
            return Err(ValidationError::MalformedUpload(format!(
                "record {i} is not a JSON object"
            )));
        };
        for key in map.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
        objects.push(map);
    }

    let mut table = Table::new(columns.clone());
    for mut map in objects {
        let row = columns
            .iter()
            .map(|c| map.remove(c).map(json_cell).unwrap_or(Cell::Missing))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_cell(v: Value) -> Cell {
    match v {
        Value::Null => Cell::Missing,
        Value::String(s) => Cell::Text(s),
        Value::Array(items) => Cell::List(items.into_iter().map(json_text).collect()),
        other => Cell::Text(other.to_string()),
    }
}

fn json_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn malformed(e: csv::Error) -> ValidationError {
    ValidationError::MalformedUpload(e.to_string())
}

/// Short SHA-256 fingerprint of an upload body, for logs (never log raw rows).
pub fn fingerprint(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    Sha256::digest(bytes)
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}
