//! Scan-and-reconcile pass over the table source.
//!
//! ## Per-row protocol
//!
//! 1. `uid` present → skip (already synced), no collaborator calls.
//! 2. Required attribute missing/blank → skip with a warning.
//! 3. Resolve identity: lookup by email, create on `NotFound`.
//! 4. Merge-upsert the profile document keyed by uid.
//! 5. Write the row's fields plus `uid` back to the table.
//!
//! Failures in 3–5 are isolated to the row. Nothing is rolled back: an
//! identity created in step 3 survives a failing step 4 or 5, and the next
//! pass reuses it through the email lookup.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use tablesync_core::{IdentityRecord, NewIdentity, ProfileDocument, RowContact, SourceRow, Uid};

use crate::credential::generate_password;
use crate::error::{IdentityError, RowError, SyncError};
use crate::ports::{DocumentStore, IdentityProvider, TableSource};
use crate::summary::{SyncOutcome, SyncSummary};

// ---------------------------------------------------------------------------
// Row outcome
// ---------------------------------------------------------------------------

/// What happened to a single row during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Identity resolved, profile upserted and uid written back.
    Synced { uid: Uid },
    /// `uid` was already set; nothing was called.
    AlreadySynced,
    /// Required attributes missing or blank; nothing was called.
    Incomplete { missing: Vec<&'static str> },
    Failed(RowError),
}

// ---------------------------------------------------------------------------
// RecordSyncJob
// ---------------------------------------------------------------------------

/// One-way sync from the table source into the identity provider and the
/// document store. Holds no state between invocations.
#[derive(Clone)]
pub struct RecordSyncJob {
    table: Arc<dyn TableSource>,
    identities: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
}

impl RecordSyncJob {
    pub fn new(
        table: Arc<dyn TableSource>,
        identities: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            table,
            identities,
            documents,
        }
    }

    /// Fetch every row and reconcile them one after another.
    ///
    /// Only a failed fetch is fatal; row failures are collected in the
    /// summary.
    pub fn run(&self) -> Result<SyncOutcome, SyncError> {
        let started_at = Utc::now();
        let started = Instant::now();

        let rows = self
            .table
            .fetch_rows()
            .map_err(SyncError::SourceUnreachable)?;
        if rows.is_empty() {
            tracing::info!("no records found in table source");
            return Ok(SyncOutcome::NoRecords);
        }

        tracing::info!(total = rows.len(), "starting sync pass");
        let mut summary = SyncSummary::new(rows.len(), started_at);
        for row in &rows {
            let outcome = self.sync_row(row);
            summary.record(&outcome);
        }
        summary.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            synced = summary.synced,
            skipped = summary.skipped,
            failed = summary.failed,
            total = summary.total,
            duration_ms = summary.duration_ms,
            "sync pass completed",
        );
        Ok(SyncOutcome::Completed(summary))
    }

    /// Reconcile a single row.
    pub fn sync_row(&self, row: &SourceRow) -> RowOutcome {
        if row.is_synced() {
            tracing::debug!(record_id = %row.record_id, "already synced");
            return RowOutcome::AlreadySynced;
        }

        let contact = match row.contact() {
            Ok(contact) => contact,
            Err(missing) => {
                tracing::warn!(
                    record_id = %row.record_id,
                    missing = ?missing,
                    "skipping incomplete record",
                );
                return RowOutcome::Incomplete { missing };
            }
        };

        match self.reconcile(row, &contact) {
            Ok(uid) => RowOutcome::Synced { uid },
            Err(err) => {
                tracing::error!(record_id = %row.record_id, error = %err, "row sync failed");
                RowOutcome::Failed(err)
            }
        }
    }

    fn reconcile(&self, row: &SourceRow, contact: &RowContact) -> Result<Uid, RowError> {
        let identity = self.resolve_identity(row, contact)?;
        let uid = identity.uid;

        let profile = ProfileDocument::new(uid.clone(), contact);
        self.documents
            .upsert_profile(&profile)
            .map_err(|source| RowError::ProfileWrite {
                record_id: row.record_id.clone(),
                uid: uid.clone(),
                source,
            })?;
        tracing::info!(record_id = %row.record_id, uid = %uid, "profile upserted");

        self.table
            .write_back(row, &uid)
            .map_err(|source| RowError::WriteBack {
                record_id: row.record_id.clone(),
                uid: uid.clone(),
                source,
            })?;
        tracing::info!(record_id = %row.record_id, uid = %uid, "uid written back");

        Ok(uid)
    }

    fn resolve_identity(
        &self,
        row: &SourceRow,
        contact: &RowContact,
    ) -> Result<IdentityRecord, RowError> {
        match self.identities.find_by_email(&contact.email) {
            Ok(existing) => {
                tracing::info!(
                    record_id = %row.record_id,
                    uid = %existing.uid,
                    "reusing existing identity",
                );
                return Ok(existing);
            }
            Err(IdentityError::NotFound) => {}
            Err(err) => return Err(identity_failure(row, contact, err)),
        }

        let request = NewIdentity {
            email: contact.email.clone(),
            password: generate_password(),
            display_name: contact.display_name.clone(),
            email_verified: true,
        };
        let created = self
            .identities
            .create(&request)
            .map_err(|err| identity_failure(row, contact, err))?;
        tracing::info!(record_id = %row.record_id, uid = %created.uid, "created identity");
        Ok(created)
    }
}

fn identity_failure(row: &SourceRow, contact: &RowContact, err: IdentityError) -> RowError {
    match err {
        IdentityError::InvalidEmail => RowError::InvalidEmail {
            record_id: row.record_id.clone(),
            email: contact.email.clone(),
        },
        source => RowError::IdentityResolution {
            record_id: row.record_id.clone(),
            source,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tablesync_core::RecordId;

    use super::*;
    use crate::error::{SourceError, StoreError};
    use crate::testing::{complete_row, InMemoryDocuments, InMemoryIdentities, InMemoryTable};

    struct Harness {
        table: Arc<InMemoryTable>,
        identities: Arc<InMemoryIdentities>,
        documents: Arc<InMemoryDocuments>,
        job: RecordSyncJob,
    }

    fn harness(rows: Vec<SourceRow>) -> Harness {
        let table = Arc::new(InMemoryTable::new(rows));
        let identities = Arc::new(InMemoryIdentities::new());
        let documents = Arc::new(InMemoryDocuments::new());
        let job = RecordSyncJob::new(table.clone(), identities.clone(), documents.clone());
        Harness {
            table,
            identities,
            documents,
            job,
        }
    }

    #[test]
    fn synced_row_is_left_alone() {
        let mut row = complete_row("rec1", "a@b.com");
        row.fields.insert("uid".into(), json!("u-existing"));
        let h = harness(vec![row.clone()]);

        assert_eq!(h.job.sync_row(&row), RowOutcome::AlreadySynced);
        assert!(h.identities.lookups().is_empty());
        assert!(h.table.patches().is_empty());
    }

    #[test]
    fn lookup_hit_reuses_identity() {
        let row = complete_row("rec1", "a@b.com");
        let h = harness(vec![row.clone()]);
        h.identities.insert_existing("a@b.com", "u-old");

        let outcome = h.job.sync_row(&row);
        assert_eq!(
            outcome,
            RowOutcome::Synced {
                uid: Uid::from("u-old")
            }
        );
        assert!(h.identities.created().is_empty());
        assert_eq!(h.documents.get(&Uid::from("u-old")).unwrap()["uid"], json!("u-old"));
    }

    #[test]
    fn created_identity_is_verified_with_fresh_password() {
        let rows = vec![
            complete_row("rec1", "a@b.com"),
            complete_row("rec2", "c@d.com"),
        ];
        let h = harness(rows.clone());
        for row in &rows {
            h.job.sync_row(row);
        }

        let created = h.identities.created();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|c| c.email_verified));
        assert_ne!(created[0].password, created[1].password);
        assert_eq!(created[0].display_name, "A B");
    }

    #[test]
    fn invalid_email_is_recorded_with_record_id() {
        let row = complete_row("recBad", "not-an-email");
        let h = harness(vec![row.clone()]);
        h.identities
            .fail_lookup("not-an-email", IdentityError::InvalidEmail);

        let RowOutcome::Failed(err) = h.job.sync_row(&row) else {
            panic!("expected failure");
        };
        assert!(matches!(err, RowError::InvalidEmail { .. }));
        assert_eq!(err.record_id(), &RecordId::from("recBad"));
        assert!(err.to_string().contains("recBad"));
        assert!(h.identities.created().is_empty());
    }

    #[test]
    fn profile_failure_skips_write_back() {
        let row = complete_row("rec1", "a@b.com");
        let h = harness(vec![row.clone()]);
        h.documents.fail_all(StoreError::Rejected {
            status: 403,
            body: "PERMISSION_DENIED".into(),
        });

        let outcome = h.job.sync_row(&row);
        assert!(matches!(outcome, RowOutcome::Failed(RowError::ProfileWrite { .. })));
        assert_eq!(h.identities.created().len(), 1, "identity stays created");
        assert!(h.table.patches().is_empty());
    }

    #[test]
    fn fetch_failure_is_fatal() {
        let h = harness(vec![complete_row("rec1", "a@b.com")]);
        h.table.fail_fetch(SourceError::Transport("connection refused".into()));

        let err = h.job.run().unwrap_err();
        assert!(matches!(err, SyncError::SourceUnreachable(_)));
        assert!(err.to_string().contains("connection refused"));
        assert!(h.identities.lookups().is_empty());
    }
}
