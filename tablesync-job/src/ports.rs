//! Collaborator traits consumed by [`crate::RecordSyncJob`].
//!
//! All calls are blocking. Implementations live in `tablesync-remote`; the
//! `testing` feature provides in-memory ones.

use tablesync_core::{IdentityRecord, NewIdentity, ProfileDocument, SourceRow, Uid};

use crate::error::{IdentityError, SourceError, StoreError};

/// Row-oriented table the job reads from and writes `uid` back to.
pub trait TableSource: Send + Sync {
    /// Every row currently in the table. No pagination.
    fn fetch_rows(&self) -> Result<Vec<SourceRow>, SourceError>;

    /// Write the row's full field set plus `uid` back, keyed by record id.
    fn write_back(&self, row: &SourceRow, uid: &Uid) -> Result<(), SourceError>;
}

/// Authentication service holding user identities.
pub trait IdentityProvider: Send + Sync {
    /// Returns [`IdentityError::NotFound`] when no identity uses `email`.
    fn find_by_email(&self, email: &str) -> Result<IdentityRecord, IdentityError>;

    fn create(&self, identity: &NewIdentity) -> Result<IdentityRecord, IdentityError>;
}

/// Document database holding per-identity profiles.
pub trait DocumentStore: Send + Sync {
    /// Merge `profile` into the document keyed by its uid, creating it if
    /// absent. Fields not named by the profile are preserved.
    fn upsert_profile(&self, profile: &ProfileDocument) -> Result<(), StoreError>;
}
