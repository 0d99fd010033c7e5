//! # tablesync-job
//!
//! Row reconciliation between the table source, the identity provider and
//! the document store.
//!
//! Build a [`RecordSyncJob`] from three collaborator handles and call
//! [`RecordSyncJob::run`] for one scan-and-reconcile pass, or
//! [`pipeline::run`] to get the JSON reply shared by the HTTP endpoint and
//! the CLI.

pub mod credential;
pub mod error;
pub mod job;
pub mod pipeline;
pub mod ports;
pub mod summary;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{IdentityError, RowError, SourceError, StoreError, SyncError};
pub use job::{RecordSyncJob, RowOutcome};
pub use pipeline::SyncReply;
pub use ports::{DocumentStore, IdentityProvider, TableSource};
pub use summary::{SyncOutcome, SyncSummary, NO_RECORDS_MESSAGE};
