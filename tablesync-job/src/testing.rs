//! In-memory collaborators for tests.
//!
//! Each fake records the calls it receives and can be scripted to fail.
//! State lives behind `std::sync::Mutex` so the fakes satisfy the
//! `Send + Sync` bounds of the collaborator traits.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{json, Map, Value};

use tablesync_core::{
    Fields, IdentityRecord, NewIdentity, ProfileDocument, RecordId, SourceRow, Uid,
};

use crate::error::{IdentityError, SourceError, StoreError};
use crate::ports::{DocumentStore, IdentityProvider, TableSource};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A row with all four required attributes and an empty `uid`.
pub fn complete_row(record_id: &str, email: &str) -> SourceRow {
    let Value::Object(fields) = json!({
        "email": email,
        "firstname": "A",
        "lastname": "B",
        "displayname": "A B",
        "uid": "",
    }) else {
        unreachable!("json! object literal");
    };
    SourceRow::new(record_id, fields)
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Table whose write-backs are applied to the stored rows, so a later fetch
/// sees the uid.
#[derive(Default)]
pub struct InMemoryTable {
    rows: Mutex<Vec<SourceRow>>,
    patches: Mutex<Vec<(RecordId, Fields)>>,
    fetches: Mutex<usize>,
    fetch_failure: Mutex<Option<SourceError>>,
    write_failures: Mutex<HashMap<RecordId, SourceError>>,
}

impl InMemoryTable {
    pub fn new(rows: Vec<SourceRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn fail_fetch(&self, err: SourceError) {
        *lock(&self.fetch_failure) = Some(err);
    }

    pub fn fail_write_back(&self, record_id: &str, err: SourceError) {
        lock(&self.write_failures).insert(RecordId::from(record_id), err);
    }

    pub fn rows(&self) -> Vec<SourceRow> {
        lock(&self.rows).clone()
    }

    /// Successful write-backs in call order.
    pub fn patches(&self) -> Vec<(RecordId, Fields)> {
        lock(&self.patches).clone()
    }

    pub fn fetch_count(&self) -> usize {
        *lock(&self.fetches)
    }
}

impl TableSource for InMemoryTable {
    fn fetch_rows(&self) -> Result<Vec<SourceRow>, SourceError> {
        *lock(&self.fetches) += 1;
        if let Some(err) = lock(&self.fetch_failure).clone() {
            return Err(err);
        }
        Ok(self.rows())
    }

    fn write_back(&self, row: &SourceRow, uid: &Uid) -> Result<(), SourceError> {
        if let Some(err) = lock(&self.write_failures).get(&row.record_id).cloned() {
            return Err(err);
        }
        let fields = row.fields_with_uid(uid);
        if let Some(stored) = lock(&self.rows)
            .iter_mut()
            .find(|r| r.record_id == row.record_id)
        {
            stored.fields = fields.clone();
        }
        lock(&self.patches).push((row.record_id.clone(), fields));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Identity provider keyed by lowercased email. Assigns `uid-<n>` on create.
#[derive(Default)]
pub struct InMemoryIdentities {
    by_email: Mutex<HashMap<String, IdentityRecord>>,
    lookups: Mutex<Vec<String>>,
    created: Mutex<Vec<NewIdentity>>,
    lookup_failures: Mutex<HashMap<String, IdentityError>>,
    create_failures: Mutex<HashMap<String, IdentityError>>,
}

impl InMemoryIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_existing(&self, email: &str, uid: &str) {
        lock(&self.by_email).insert(
            email.to_lowercase(),
            IdentityRecord {
                uid: Uid::from(uid),
                email: email.to_string(),
                display_name: None,
            },
        );
    }

    pub fn fail_lookup(&self, email: &str, err: IdentityError) {
        lock(&self.lookup_failures).insert(email.to_lowercase(), err);
    }

    pub fn fail_create(&self, email: &str, err: IdentityError) {
        lock(&self.create_failures).insert(email.to_lowercase(), err);
    }

    /// Emails looked up, in call order.
    pub fn lookups(&self) -> Vec<String> {
        lock(&self.lookups).clone()
    }

    /// Create requests that succeeded, in call order.
    pub fn created(&self) -> Vec<NewIdentity> {
        lock(&self.created).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.by_email).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityProvider for InMemoryIdentities {
    fn find_by_email(&self, email: &str) -> Result<IdentityRecord, IdentityError> {
        let key = email.to_lowercase();
        lock(&self.lookups).push(email.to_string());
        if let Some(err) = lock(&self.lookup_failures).get(&key).cloned() {
            return Err(err);
        }
        lock(&self.by_email)
            .get(&key)
            .cloned()
            .ok_or(IdentityError::NotFound)
    }

    fn create(&self, identity: &NewIdentity) -> Result<IdentityRecord, IdentityError> {
        let key = identity.email.to_lowercase();
        if let Some(err) = lock(&self.create_failures).get(&key).cloned() {
            return Err(err);
        }
        let mut by_email = lock(&self.by_email);
        if by_email.contains_key(&key) {
            return Err(IdentityError::EmailExists);
        }
        let record = IdentityRecord {
            uid: Uid::from(format!("uid-{}", by_email.len() + 1)),
            email: identity.email.clone(),
            display_name: Some(identity.display_name.clone()),
        };
        by_email.insert(key, record.clone());
        lock(&self.created).push(identity.clone());
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Document store with field-level merge on upsert.
#[derive(Default)]
pub struct InMemoryDocuments {
    docs: Mutex<HashMap<Uid, Map<String, Value>>>,
    upserts: Mutex<usize>,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a document, e.g. with fields the job does not own.
    pub fn seed(&self, uid: &str, fields: Value) {
        if let Value::Object(map) = fields {
            lock(&self.docs).insert(Uid::from(uid), map);
        }
    }

    pub fn fail_all(&self, err: StoreError) {
        *lock(&self.failure) = Some(err);
    }

    pub fn get(&self, uid: &Uid) -> Option<Value> {
        lock(&self.docs).get(uid).cloned().map(Value::Object)
    }

    pub fn upsert_count(&self) -> usize {
        *lock(&self.upserts)
    }
}

impl DocumentStore for InMemoryDocuments {
    fn upsert_profile(&self, profile: &ProfileDocument) -> Result<(), StoreError> {
        if let Some(err) = lock(&self.failure).clone() {
            return Err(err);
        }
        let mut docs = lock(&self.docs);
        let doc = docs.entry(profile.uid.clone()).or_default();
        for (name, value) in profile.fields() {
            doc.insert(name.to_string(), Value::String(value.to_string()));
        }
        *lock(&self.upserts) += 1;
        Ok(())
    }
}
