//! Shared sync entrypoint used by the HTTP server and the CLI.

use serde_json::{json, Value};

use crate::job::RecordSyncJob;

/// JSON reply for one invocation.
///
/// `ok == false` means the pass was aborted before any row was processed
/// and `body` is `{ "error": "<message>" }`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReply {
    pub ok: bool,
    pub body: Value,
}

/// Run one pass and fold the result into a [`SyncReply`].
pub fn run(job: &RecordSyncJob) -> SyncReply {
    match job.run() {
        Ok(outcome) => SyncReply {
            ok: true,
            body: outcome.response_body(),
        },
        Err(err) => {
            tracing::error!(error = %err, "sync invocation failed");
            SyncReply {
                ok: false,
                body: json!({ "error": err.to_string() }),
            }
        }
    }
}
