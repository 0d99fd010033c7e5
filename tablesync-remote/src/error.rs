//! Error types for tablesync-remote.

use thiserror::Error;

/// Setup and credential failures. Per-request failures are reported through
/// the `tablesync-job` error types instead.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("service account is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("service account is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("service account is missing {0}")]
    Credentials(&'static str),

    #[error("failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("access token exchange failed: {0}")]
    Token(String),
}
