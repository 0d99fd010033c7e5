//! OAuth2 access tokens for the Google REST APIs.
//!
//! Service-account flow: sign an RS256 JWT assertion, exchange it at the
//! account's `token_uri`, cache the access token until shortly before it
//! expires.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::RemoteError;
use crate::firebase::credentials::ServiceAccount;
use crate::http::HttpFailure;

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Bearer accepted by the Auth and Firestore emulators.
pub const EMULATOR_TOKEN: &str = "owner";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
pub(crate) struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

impl AssertionClaims {
    pub(crate) fn new(account: &ServiceAccount, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: account.client_email.clone(),
            scope: SCOPES.join(" "),
            aud: account.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

enum Source {
    Static(String),
    ServiceAccount {
        account: ServiceAccount,
        agent: Agent,
        cached: Mutex<Option<CachedToken>>,
    },
}

/// Where bearer tokens come from.
pub struct TokenSource {
    source: Source,
}

impl TokenSource {
    pub fn emulator() -> Self {
        Self::fixed(EMULATOR_TOKEN)
    }

    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: Source::Static(token.into()),
        }
    }

    pub fn service_account(account: ServiceAccount, agent: Agent) -> Self {
        Self {
            source: Source::ServiceAccount {
                account,
                agent,
                cached: Mutex::new(None),
            },
        }
    }

    /// A currently valid access token, exchanging a new one if needed.
    pub fn bearer(&self) -> Result<String, RemoteError> {
        match &self.source {
            Source::Static(token) => Ok(token.clone()),
            Source::ServiceAccount {
                account,
                agent,
                cached,
            } => {
                let mut cached = cached.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Utc::now();
                if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
                    return Ok(token.value.clone());
                }
                let token = exchange(account, agent, now)?;
                let value = token.value.clone();
                *cached = Some(token);
                Ok(value)
            }
        }
    }
}

pub(crate) fn sign_assertion(
    account: &ServiceAccount,
    now: DateTime<Utc>,
) -> Result<String, RemoteError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = account.private_key_id.clone();
    let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
    Ok(encode(&header, &AssertionClaims::new(account, now), &key)?)
}

fn exchange(
    account: &ServiceAccount,
    agent: &Agent,
    now: DateTime<Utc>,
) -> Result<CachedToken, RemoteError> {
    let assertion = sign_assertion(account, now)?;
    let response = agent
        .post(&account.token_uri)
        .send_form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
        .map_err(|e| match HttpFailure::from(e) {
            HttpFailure::Status { status, body } => {
                RemoteError::Token(format!("HTTP {status}: {body}"))
            }
            HttpFailure::Transport(message) => RemoteError::Token(message),
        })?;
    let token: TokenResponse = response
        .into_json()
        .map_err(|e| RemoteError::Token(e.to_string()))?;
    tracing::debug!(expires_in = token.expires_in, "exchanged service account token");
    Ok(CachedToken {
        value: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(private_key: &str) -> ServiceAccount {
        ServiceAccount {
            project_id: "demo".into(),
            client_email: "sync@demo.iam.gserviceaccount.com".into(),
            private_key: private_key.into(),
            private_key_id: None,
            token_uri: "https://oauth2.googleapis.com/token".into(),
        }
    }

    #[test]
    fn static_source_returns_its_token() {
        assert_eq!(TokenSource::emulator().bearer().unwrap(), "owner");
    }

    #[test]
    fn claims_cover_one_hour_for_the_token_uri() {
        let now = Utc::now();
        let claims = AssertionClaims::new(&account("unused"), now);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert!(claims.scope.contains("identitytoolkit"));
        assert!(claims.scope.contains("datastore"));
    }

    #[test]
    fn malformed_private_key_fails_signing() {
        let err = sign_assertion(&account("not a pem"), Utc::now()).unwrap_err();
        assert!(matches!(err, RemoteError::Jwt(_)), "got: {err}");
    }

    #[test]
    fn cached_token_refreshes_inside_margin() {
        let now = Utc::now();
        let token = CachedToken {
            value: "t".into(),
            expires_at: now + Duration::seconds(90),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(31)));
    }
}
