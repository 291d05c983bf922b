// src/analyze/mod.rs
//! Client analysis: engagement score, sentiment, trend and flag per record,
//! plus top-N ranking over the results.

pub mod engagement;
pub mod flag;
pub mod rank;
pub mod trend;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::InsightsConfig;
use crate::dataset::ClientRecord;
use crate::error::ParseError;
use crate::sentiment::PolarityProvider;

// Re-export convenient types.
pub use crate::analyze::engagement::{engagement_score, EngagementParams};
pub use crate::analyze::flag::{classify, Flag, FlagThresholds};
pub use crate::analyze::rank::{parse_top_params, top, Metric};
pub use crate::analyze::trend::{average_sentiment, sentiment_trend};

/// Date format of `last_contact` cells.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Derived view of one client. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    pub engagement_score: u32,
    pub sentiment: f64,
    pub trend: f64,
    pub flag: Flag,
}

/// What an analysis pass does with a row whose `last_contact` does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFailurePolicy {
    /// Fail the whole pass on the first bad row.
    #[default]
    Abort,
    /// Log and omit bad rows.
    Skip,
}

/// Composes scorer, aggregator and classifier around an injected provider.
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn PolarityProvider>,
    engagement: EngagementParams,
    flags: FlagThresholds,
    on_invalid_row: RowFailurePolicy,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("engagement", &self.engagement)
            .field("flags", &self.flags)
            .field("on_invalid_row", &self.on_invalid_row)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Analyzer with default scoring params.
    pub fn new(provider: Arc<dyn PolarityProvider>) -> Self {
        Self {
            provider,
            engagement: EngagementParams::default(),
            flags: FlagThresholds::default(),
            on_invalid_row: RowFailurePolicy::default(),
        }
    }

    pub fn with_config(provider: Arc<dyn PolarityProvider>, cfg: &InsightsConfig) -> Self {
        Self {
            provider,
            engagement: cfg.engagement,
            flags: cfg.flags,
            on_invalid_row: cfg.analysis.on_invalid_row,
        }
    }

    pub fn on_invalid_row(mut self, policy: RowFailurePolicy) -> Self {
        self.on_invalid_row = policy;
        self
    }

    pub fn policy(&self) -> RowFailurePolicy {
        self.on_invalid_row
    }

    /// Analyze one record; `row` only labels the error.
    pub fn analyze_client(
        &self,
        row: usize,
        record: &ClientRecord,
        today: NaiveDate,
    ) -> Result<AnalysisResult, ParseError> {
        let last_contact = parse_last_contact(&record.last_contact).map_err(|source| ParseError {
            row,
            name: record.name.clone(),
            value: record.last_contact.clone(),
            source,
        })?;

        let score = engagement_score(last_contact, record.emails.len(), today, &self.engagement);
        let sentiment = average_sentiment(self.provider.as_ref(), &record.emails);
        let trend = sentiment_trend(self.provider.as_ref(), &record.emails);
        let flag = classify(score, sentiment, &self.flags);

        Ok(AnalysisResult {
            name: record.name.clone(),
            engagement_score: score,
            sentiment,
            trend,
            flag,
        })
    }

    /// Analyze every record in order, honoring the row failure policy.
    pub fn analyze_all(
        &self,
        clients: &[ClientRecord],
        today: NaiveDate,
    ) -> Result<Vec<AnalysisResult>, ParseError> {
        let mut out = Vec::with_capacity(clients.len());
        for (row, record) in clients.iter().enumerate() {
            match self.analyze_client(row, record, today) {
                Ok(r) => out.push(r),
                Err(e) if self.on_invalid_row == RowFailurePolicy::Skip => {
                    warn!(row = e.row, value = %e.value, "skipping client with invalid last_contact");
                }
                Err(e) => return Err(e),
            }
        }
        debug!(clients = clients.len(), analyzed = out.len(), %today, "analysis pass");
        Ok(out)
    }
}

pub fn parse_last_contact(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
}
