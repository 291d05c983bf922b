// src/ingest/mod.rs
//! Upload ingestion: tabular input → validated `ClientRecord`s.
//!
//! Cells are never evaluated; the `emails` column uses a fixed `;` split.

pub mod sources;

use crate::dataset::ClientRecord;
use crate::error::ValidationError;

pub use sources::{fingerprint, table_from_csv, table_from_json};

pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "last_contact", "emails"];
pub const EMAIL_DELIMITER: &str = ";";

/// One uploaded cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Empty CSV field, JSON null or absent key.
    Missing,
    Text(String),
    /// Already-structured list (JSON arrays).
    List(Vec<String>),
}

impl Cell {
    fn into_text(self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Text(s) => s,
            Cell::List(items) => items.join(EMAIL_DELIMITER),
        }
    }

    /// `"a;b"` → `["a", "b"]`; no trimming, so `"a;"` → `["a", ""]`.
    fn into_messages(self) -> Vec<String> {
        match self {
            Cell::Missing => Vec::new(),
            Cell::Text(s) => s.split(EMAIL_DELIMITER).map(str::to_string).collect(),
            Cell::List(items) => items,
        }
    }
}

/// Rows with named columns, as received from an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with `Missing`, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Required columns absent from the header, sorted.
    pub fn missing_columns(&self) -> Vec<String> {
        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|req| self.position(req).is_none())
            .map(|s| s.to_string())
            .collect();
        missing.sort();
        missing
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Validate the header and convert every row. No per-row date checks.
    pub fn into_client_records(self) -> Result<Vec<ClientRecord>, ValidationError> {
        let (Some(name_ix), Some(date_ix), Some(emails_ix)) = (
            self.position("name"),
            self.position("last_contact"),
            self.position("emails"),
        ) else {
            return Err(ValidationError::MissingColumns(self.missing_columns()));
        };

        let records = self
            .rows
            .into_iter()
            .map(|mut row| ClientRecord {
                name: take(&mut row, name_ix).into_text(),
                last_contact: take(&mut row, date_ix).into_text(),
                emails: take(&mut row, emails_ix).into_messages(),
            })
            .collect();
        Ok(records)
    }
}

fn take(row: &mut [Cell], ix: usize) -> Cell {
    row.get_mut(ix)
        .map(|c| std::mem::replace(c, Cell::Missing))
        .unwrap_or(Cell::Missing)
}
