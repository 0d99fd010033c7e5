//! Domain types for tablesync.
//!
//! Source rows keep their field map as raw JSON so that attributes the job
//! does not know about survive the write-back untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw attribute map of a source row.
pub type Fields = Map<String, Value>;

/// Attributes a row must carry before an identity is created for it.
pub const REQUIRED_ATTRIBUTES: [&str; 4] = ["email", "firstname", "lastname", "displayname"];

/// Attribute holding the identity uid once a row is synced.
pub const UID_ATTRIBUTE: &str = "uid";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Source-assigned identifier of a table row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid(pub String);

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Uid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Uid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Source rows
// ---------------------------------------------------------------------------

/// One row of the table source, as returned by the records endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    #[serde(rename = "recordId")]
    pub record_id: RecordId,
    #[serde(default)]
    pub fields: Fields,
}

/// The four required attributes of a row, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
}

impl SourceRow {
    pub fn new(record_id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            record_id: record_id.into(),
            fields,
        }
    }

    /// A row is synced iff its `uid` attribute is non-empty.
    ///
    /// Strings are trimmed first; `null`, `false` and numeric zero count as
    /// empty and any other JSON value counts as present.
    pub fn is_synced(&self) -> bool {
        match self.fields.get(UID_ATTRIBUTE) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(_) => true,
        }
    }

    /// Trimmed string value of `name`, or `None` when absent, blank, or not
    /// a string.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// Required attributes that are missing or blank, in declaration order.
    pub fn missing_attributes(&self) -> Vec<&'static str> {
        REQUIRED_ATTRIBUTES
            .iter()
            .copied()
            .filter(|name| self.attribute(name).is_none())
            .collect()
    }

    /// Extract the required attributes, or the list of those missing.
    pub fn contact(&self) -> Result<RowContact, Vec<&'static str>> {
        match (
            self.attribute("email"),
            self.attribute("firstname"),
            self.attribute("lastname"),
            self.attribute("displayname"),
        ) {
            (Some(email), Some(first), Some(last), Some(display)) => Ok(RowContact {
                email: email.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                display_name: display.to_string(),
            }),
            _ => Err(self.missing_attributes()),
        }
    }

    /// The row's full field set with `uid` set to `uid`.
    pub fn fields_with_uid(&self, uid: &Uid) -> Fields {
        let mut fields = self.fields.clone();
        fields.insert(UID_ATTRIBUTE.to_string(), Value::String(uid.0.clone()));
        fields
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// An identity as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub uid: Uid,
    pub email: String,
    pub display_name: Option<String>,
}

/// Create request for a new identity. The password is write-only.
#[derive(Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub email_verified: bool,
}

impl fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewIdentity")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("email_verified", &self.email_verified)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Per-identity profile document, keyed by `uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub display_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: Uid,
}

impl ProfileDocument {
    pub fn new(uid: Uid, contact: &RowContact) -> Self {
        Self {
            display_name: contact.display_name.clone(),
            email: contact.email.clone(),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            uid,
        }
    }

    /// Field name / value pairs in document order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("display_name", self.display_name.as_str()),
            ("email", self.email.as_str()),
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("uid", self.uid.0.as_str()),
        ]
    }
}
