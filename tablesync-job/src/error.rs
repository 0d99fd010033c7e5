//! Error types for tablesync-job.

use thiserror::Error;

use tablesync_core::{RecordId, Uid};

/// Failures talking to the table source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection, DNS or TLS failure.
    #[error("table request failed: {0}")]
    Transport(String),

    /// The table answered with a non-success status.
    #[error("table responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The table answered with a body that is not the expected JSON.
    #[error("table response could not be decoded: {0}")]
    Decode(String),
}

/// Failures reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("no identity registered for this email")]
    NotFound,

    #[error("email address is malformed")]
    InvalidEmail,

    /// Create raced with another creator for the same email.
    #[error("an identity already exists for this email")]
    EmailExists,

    #[error("identity provider rejected the request (HTTP {code}): {message}")]
    Rejected { code: u16, message: String },

    #[error("identity provider unreachable: {0}")]
    Transport(String),
}

/// Failures reported by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store unreachable: {0}")]
    Transport(String),

    #[error("document store responded with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A failure isolated to one row. The row is counted as skipped and the
/// rendered message lands in the summary's error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("record {record_id}: invalid email format '{email}'")]
    InvalidEmail { record_id: RecordId, email: String },

    #[error("record {record_id}: identity resolution failed: {source}")]
    IdentityResolution {
        record_id: RecordId,
        #[source]
        source: IdentityError,
    },

    /// The identity exists but its profile could not be written.
    #[error("record {record_id}: profile upsert failed for uid {uid}: {source}")]
    ProfileWrite {
        record_id: RecordId,
        uid: Uid,
        #[source]
        source: StoreError,
    },

    /// Identity and profile exist but the row was not marked as synced.
    #[error("record {record_id}: table write-back failed for uid {uid}: {source}")]
    WriteBack {
        record_id: RecordId,
        uid: Uid,
        #[source]
        source: SourceError,
    },
}

impl RowError {
    pub fn record_id(&self) -> &RecordId {
        match self {
            RowError::InvalidEmail { record_id, .. }
            | RowError::IdentityResolution { record_id, .. }
            | RowError::ProfileWrite { record_id, .. }
            | RowError::WriteBack { record_id, .. } => record_id,
        }
    }
}

/// Invocation-level failure: nothing was reconciled.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch records from AITable: {0}")]
    SourceUnreachable(#[source] SourceError),
}
