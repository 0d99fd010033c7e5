//! Cloud Firestore REST client for profile documents.
//!
//! Upserts are `PATCH` requests with one `updateMask.fieldPaths` per profile
//! field: the document is created when absent and fields outside the mask
//! are left alone.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use ureq::Agent;

use tablesync_core::ProfileDocument;
use tablesync_job::{DocumentStore, StoreError};

use crate::firebase::token::TokenSource;
use crate::http::{self, HttpFailure};

pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com";

const DATABASE: &str = "(default)";

/// Firestore document body for a profile: every field as a `stringValue`.
pub fn document_body(profile: &ProfileDocument) -> Value {
    let fields: Map<String, Value> = profile
        .fields()
        .into_iter()
        .map(|(name, value)| (name.to_string(), json!({ "stringValue": value })))
        .collect();
    json!({ "fields": fields })
}

fn store_error(failure: HttpFailure) -> StoreError {
    match failure {
        HttpFailure::Status { status, body } => StoreError::Rejected { status, body },
        HttpFailure::Transport(message) => StoreError::Transport(message),
    }
}

/// Profile collection in one project's default database.
pub struct Firestore {
    agent: Agent,
    base_url: String,
    project_id: String,
    collection: String,
    tokens: Arc<TokenSource>,
}

impl Firestore {
    pub fn new(
        agent: Agent,
        base_url: impl Into<String>,
        project_id: String,
        collection: String,
        tokens: Arc<TokenSource>,
    ) -> Self {
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id,
            collection,
            tokens,
        }
    }

    pub fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/{DATABASE}/documents/{}/{document_id}",
            self.base_url, self.project_id, self.collection
        )
    }
}

impl DocumentStore for Firestore {
    fn upsert_profile(&self, profile: &ProfileDocument) -> Result<(), StoreError> {
        let token = self
            .tokens
            .bearer()
            .map_err(|e| StoreError::Transport(format!("could not obtain access token: {e}")))?;
        let mut request = self
            .agent
            .request("PATCH", &self.document_url(&profile.uid.0))
            .set("Authorization", &http::bearer(&token));
        for (name, _) in profile.fields() {
            request = request.query("updateMask.fieldPaths", name);
        }
        request
            .send_json(document_body(profile))
            .map_err(|e| store_error(e.into()))?;
        tracing::debug!(uid = %profile.uid, collection = %self.collection, "profile upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tablesync_core::{RowContact, Uid};

    use super::*;

    fn profile() -> ProfileDocument {
        let contact = RowContact {
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            display_name: "Ada L".into(),
        };
        ProfileDocument::new(Uid::from("u-1"), &contact)
    }

    #[test]
    fn body_wraps_every_field_as_string_value() {
        assert_eq!(
            document_body(&profile()),
            json!({
                "fields": {
                    "display_name": { "stringValue": "Ada L" },
                    "email": { "stringValue": "ada@example.com" },
                    "first_name": { "stringValue": "Ada" },
                    "last_name": { "stringValue": "Lovelace" },
                    "uid": { "stringValue": "u-1" },
                }
            })
        );
    }

    #[test]
    fn document_url_targets_default_database() {
        let store = Firestore::new(
            http::agent(),
            "http://localhost:8080/",
            "demo".into(),
            "user".into(),
            Arc::new(TokenSource::emulator()),
        );
        assert_eq!(
            store.document_url("u-1"),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/user/u-1"
        );
    }
}
