//! Per-invocation counts and the JSON body built from them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::job::RowOutcome;

pub const NO_RECORDS_MESSAGE: &str = "No records found in AITable.";

/// Result of a pass that reached the table source.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The table returned zero rows; nothing was written anywhere.
    NoRecords,
    Completed(SyncSummary),
}

impl SyncOutcome {
    pub fn message(&self) -> String {
        match self {
            SyncOutcome::NoRecords => NO_RECORDS_MESSAGE.to_string(),
            SyncOutcome::Completed(summary) => summary.message(),
        }
    }

    /// `{ "message" }` for an empty table, otherwise
    /// `{ "message", "details", "errors"? }`.
    pub fn response_body(&self) -> Value {
        match self {
            SyncOutcome::NoRecords => json!({ "message": NO_RECORDS_MESSAGE }),
            SyncOutcome::Completed(summary) => {
                let mut body = json!({
                    "message": summary.message(),
                    "details": summary,
                });
                if !summary.errors.is_empty() {
                    body["errors"] = json!(summary.errors);
                }
                body
            }
        }
    }
}

/// Counts for one invocation. Not persisted.
///
/// `skipped` is `already_synced + incomplete + failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub synced: usize,
    pub skipped: usize,
    pub total: usize,
    pub already_synced: usize,
    pub incomplete: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Row-level error messages in row order.
    #[serde(skip)]
    pub errors: Vec<String>,
}

impl SyncSummary {
    pub fn new(total: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            synced: 0,
            skipped: 0,
            total,
            already_synced: 0,
            incomplete: 0,
            failed: 0,
            started_at,
            duration_ms: 0,
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Synced { .. } => self.synced += 1,
            RowOutcome::AlreadySynced => {
                self.skipped += 1;
                self.already_synced += 1;
            }
            RowOutcome::Incomplete { .. } => {
                self.skipped += 1;
                self.incomplete += 1;
            }
            RowOutcome::Failed(err) => {
                self.skipped += 1;
                self.failed += 1;
                self.errors.push(err.to_string());
            }
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Sync complete. Synced {} users. Skipped {} records. Total records: {}",
            self.synced, self.skipped, self.total
        )
    }
}
