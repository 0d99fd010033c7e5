use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::error::RemoteError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a Google service-account key file the clients need.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccount {
    /// Decode a standard-base64 service-account JSON document.
    pub fn from_base64(encoded: &str) -> Result<Self, RemoteError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, RemoteError> {
        let account: ServiceAccount = serde_json::from_slice(bytes)?;
        if account.project_id.trim().is_empty() {
            return Err(RemoteError::Credentials("project_id"));
        }
        if account.client_email.trim().is_empty() {
            return Err(RemoteError::Credentials("client_email"));
        }
        if account.private_key.trim().is_empty() {
            return Err(RemoteError::Credentials("private_key"));
        }
        Ok(account)
    }
}
