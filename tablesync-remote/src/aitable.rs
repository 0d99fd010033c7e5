//! AITable records API client.
//!
//! `GET` returns `{ data: { records: [ { recordId, fields } ] } }`; a missing
//! `data` or `records` is an empty table. Write-back `PATCH`es one record at
//! a time with `fieldKey: "name"` so fields are addressed by column name.

use serde::Deserialize;
use serde_json::{json, Value};
use ureq::Agent;

use tablesync_core::{Settings, SourceRow, Uid};
use tablesync_job::{SourceError, TableSource};

use crate::http::{self, HttpFailure};

pub const FIELD_KEY: &str = "name";

#[derive(Debug, Deserialize)]
struct RecordsEnvelope {
    #[serde(default)]
    data: Option<RecordsData>,
}

#[derive(Debug, Deserialize)]
struct RecordsData {
    #[serde(default)]
    records: Option<Vec<SourceRow>>,
}

/// Decode a records listing body.
pub fn parse_records(body: &str) -> Result<Vec<SourceRow>, SourceError> {
    let envelope: RecordsEnvelope =
        serde_json::from_str(body).map_err(|e| SourceError::Decode(e.to_string()))?;
    Ok(envelope
        .data
        .and_then(|data| data.records)
        .unwrap_or_default())
}

/// Write-back body: the row's full field set with `uid` set.
pub fn patch_body(row: &SourceRow, uid: &Uid) -> Value {
    json!({
        "records": [
            {
                "recordId": row.record_id,
                "fields": row.fields_with_uid(uid),
            }
        ],
        "fieldKey": FIELD_KEY,
    })
}

fn source_error(failure: HttpFailure) -> SourceError {
    match failure {
        HttpFailure::Status { status, body } => SourceError::Status { status, body },
        HttpFailure::Transport(message) => SourceError::Transport(message),
    }
}

/// Bearer-authenticated client for one datasheet.
pub struct AitableClient {
    agent: Agent,
    records_url: String,
    patch_url: String,
    token: String,
}

impl AitableClient {
    pub fn new(
        records_url: impl Into<String>,
        patch_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            agent: http::agent(),
            records_url: records_url.into(),
            patch_url: patch_url.into(),
            token: token.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.aitable_api_url.clone(),
            settings.patch_url.clone(),
            settings.aitable_token.clone(),
        )
    }
}

impl TableSource for AitableClient {
    fn fetch_rows(&self) -> Result<Vec<SourceRow>, SourceError> {
        let response = self
            .agent
            .get(&self.records_url)
            .set("Authorization", &http::bearer(&self.token))
            .call()
            .map_err(|e| source_error(e.into()))?;
        let body = response
            .into_string()
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        let rows = parse_records(&body)?;
        tracing::debug!(count = rows.len(), "fetched table records");
        Ok(rows)
    }

    fn write_back(&self, row: &SourceRow, uid: &Uid) -> Result<(), SourceError> {
        self.agent
            .request("PATCH", &self.patch_url)
            .set("Authorization", &http::bearer(&self.token))
            .send_json(patch_body(row, uid))
            .map_err(|e| {
                let err = source_error(e.into());
                tracing::warn!(record_id = %row.record_id, error = %err, "table patch rejected");
                err
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tablesync_core::RecordId;

    use super::*;

    #[test]
    fn parses_records_listing() {
        let body = json!({
            "code": 200,
            "success": true,
            "data": {
                "total": 1,
                "records": [
                    { "recordId": "recA", "fields": { "email": "a@b.com" } }
                ]
            }
        })
        .to_string();
        let rows = parse_records(&body).expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record_id, RecordId::from("recA"));
    }

    #[test]
    fn missing_data_or_records_is_empty() {
        assert!(parse_records(r#"{"success": false}"#).unwrap().is_empty());
        assert!(parse_records(r#"{"data": null}"#).unwrap().is_empty());
        assert!(parse_records(r#"{"data": {"records": null}}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = parse_records("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn patch_body_wraps_single_record_by_name() {
        let row: SourceRow = serde_json::from_value(json!({
            "recordId": "recA",
            "fields": { "email": "a@b.com", "uid": "" }
        }))
        .unwrap();
        let body = patch_body(&row, &Uid::from("u-1"));
        assert_eq!(
            body,
            json!({
                "records": [
                    { "recordId": "recA", "fields": { "email": "a@b.com", "uid": "u-1" } }
                ],
                "fieldKey": "name"
            })
        );
    }
}
