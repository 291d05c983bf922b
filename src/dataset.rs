//! # Dataset Store
//! Versioned, in-memory collection of client records.
//!
//! Readers take an `Arc` snapshot under a short read lock; uploads build the
//! new dataset first and swap it in under the write lock. A reader therefore
//! sees either the old or the new dataset, never a mix.

use metrics::gauge;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::error::ValidationError;
use crate::ingest::Table;

/// One client's raw contact history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub name: String,
    /// Raw `YYYY-MM-DD` text; parsed when analyzed.
    pub last_contact: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

impl ClientRecord {
    pub fn new(name: &str, last_contact: &str, emails: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            last_contact: last_contact.to_string(),
            emails: emails.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    /// 0 for the boot dataset, +1 per successful replacement.
    pub version: u64,
    pub clients: Vec<ClientRecord>,
}

/// Result of a successful replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaceOutcome {
    pub version: u64,
    pub clients: usize,
}

/// Shared handle to the current dataset. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct DatasetHandle {
    inner: Arc<RwLock<Arc<Dataset>>>,
}

impl DatasetHandle {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        record_gauges(0, clients.len());
        Self {
            inner: Arc::new(RwLock::new(Arc::new(Dataset { version: 0, clients }))),
        }
    }

    /// Handle seeded with [`sample_clients`].
    pub fn with_sample() -> Self {
        Self::new(sample_clients())
    }

    /// Snapshot of the current dataset.
    pub fn list_clients(&self) -> Arc<Dataset> {
        // The guarded value is a single Arc, a poisoned lock still holds a whole dataset.
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Validate `table` and, only if it is valid, replace the whole dataset.
    pub fn replace_dataset(&self, table: Table) -> Result<ReplaceOutcome, ValidationError> {
        let clients = table.into_client_records()?;
        Ok(self.install(clients))
    }

    /// Swap in already-validated records.
    pub fn install(&self, clients: Vec<ClientRecord>) -> ReplaceOutcome {
        let count = clients.len();
        let version = {
            let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
            let version = guard.version + 1;
            *guard = Arc::new(Dataset { version, clients });
            version
        };
        record_gauges(version, count);
        info!(version, clients = count, "dataset replaced");
        ReplaceOutcome {
            version,
            clients: count,
        }
    }
}

fn record_gauges(version: u64, clients: usize) {
    gauge!(crate::metrics::DATASET_VERSION).set(version as f64);
    gauge!(crate::metrics::DATASET_CLIENTS).set(clients as f64);
}

/// Built-in dataset served until the first upload.
pub fn sample_clients() -> Vec<ClientRecord> {
    vec![
        ClientRecord::new(
            "Client A",
            "2025-05-20",
            &["Great work!", "Appreciate the update."],
        ),
        ClientRecord::new(
            "Client B",
            "2025-04-10",
            &["Need help with the issue.", "Please follow up."],
        ),
        ClientRecord::new(
            "Client C",
            "2025-03-05",
            &["This is unacceptable.", "Very disappointed."],
        ),
        ClientRecord::new(
            "Client D",
            "2025-05-22",
            &["Excellent support!", "Let's continue this."],
        ),
    ]
}
