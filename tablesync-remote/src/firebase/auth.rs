//! Identity Toolkit (Firebase Auth) admin REST client.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use ureq::Agent;

use tablesync_core::{IdentityRecord, NewIdentity, Uid};
use tablesync_job::{IdentityError, IdentityProvider};

use crate::firebase::token::TokenSource;
use crate::http::{self, HttpFailure};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map an error response to an [`IdentityError`].
///
/// Identity Toolkit reports the reason as an upper-case code in
/// `error.message`, sometimes followed by ` : detail`.
pub fn classify_error(status: u16, body: &str) -> IdentityError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "INVALID_EMAIL" => IdentityError::InvalidEmail,
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => IdentityError::EmailExists,
        "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => IdentityError::NotFound,
        _ => IdentityError::Rejected {
            code: status,
            message,
        },
    }
}

fn identity_error(failure: HttpFailure) -> IdentityError {
    match failure {
        HttpFailure::Status { status, body } => classify_error(status, &body),
        HttpFailure::Transport(message) => IdentityError::Transport(message),
    }
}

/// Admin client scoped to one project.
pub struct FirebaseAuth {
    agent: Agent,
    base_url: String,
    project_id: String,
    tokens: Arc<TokenSource>,
}

impl FirebaseAuth {
    pub fn new(
        agent: Agent,
        base_url: impl Into<String>,
        project_id: String,
        tokens: Arc<TokenSource>,
    ) -> Self {
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id,
            tokens,
        }
    }

    fn accounts_url(&self, action: &str) -> String {
        format!(
            "{}/v1/projects/{}/accounts{action}",
            self.base_url, self.project_id
        )
    }

    fn post(&self, url: &str, body: serde_json::Value) -> Result<ureq::Response, IdentityError> {
        let token = self.tokens.bearer().map_err(|e| {
            IdentityError::Transport(format!("could not obtain access token: {e}"))
        })?;
        self.agent
            .post(url)
            .set("Authorization", &http::bearer(&token))
            .send_json(body)
            .map_err(|e| identity_error(e.into()))
    }
}

impl IdentityProvider for FirebaseAuth {
    fn find_by_email(&self, email: &str) -> Result<IdentityRecord, IdentityError> {
        let response = self.post(&self.accounts_url(":lookup"), json!({ "email": [email] }))?;
        let lookup: LookupResponse = response
            .into_json()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::NotFound)?;
        Ok(IdentityRecord {
            uid: Uid(user.local_id),
            email: user.email.unwrap_or_else(|| email.to_string()),
            display_name: user.display_name,
        })
    }

    fn create(&self, identity: &NewIdentity) -> Result<IdentityRecord, IdentityError> {
        let body = json!({
            "email": identity.email,
            "password": identity.password,
            "displayName": identity.display_name,
            "emailVerified": identity.email_verified,
        });
        let response = self.post(&self.accounts_url(""), body)?;
        let created: SignUpResponse = response
            .into_json()
            .map_err(|e| IdentityError::Transport(e.to_string()))?;
        tracing::debug!(uid = %created.local_id, "identity created");
        Ok(IdentityRecord {
            uid: Uid(created.local_id),
            email: created.email.unwrap_or_else(|| identity.email.clone()),
            display_name: created
                .display_name
                .or_else(|| Some(identity.display_name.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn error_body(message: &str) -> String {
        json!({ "error": { "code": 400, "message": message, "errors": [] } }).to_string()
    }

    #[rstest]
    #[case("INVALID_EMAIL", IdentityError::InvalidEmail)]
    #[case("EMAIL_EXISTS", IdentityError::EmailExists)]
    #[case("USER_NOT_FOUND", IdentityError::NotFound)]
    #[case("EMAIL_NOT_FOUND", IdentityError::NotFound)]
    #[case("INVALID_EMAIL : bad address", IdentityError::InvalidEmail)]
    fn known_codes_are_classified(#[case] message: &str, #[case] expected: IdentityError) {
        assert_eq!(classify_error(400, &error_body(message)), expected);
    }

    #[test]
    fn unknown_code_is_rejected_with_status() {
        let err = classify_error(403, &error_body("PERMISSION_DENIED"));
        assert_eq!(
            err,
            IdentityError::Rejected {
                code: 403,
                message: "PERMISSION_DENIED".into()
            }
        );
    }

    #[test]
    fn non_json_body_is_kept_verbatim() {
        let err = classify_error(502, "bad gateway\n");
        assert_eq!(
            err,
            IdentityError::Rejected {
                code: 502,
                message: "bad gateway".into()
            }
        );
    }

    #[test]
    fn account_urls_use_project_path() {
        let auth = FirebaseAuth::new(
            http::agent(),
            "http://localhost:9099/identitytoolkit.googleapis.com/",
            "demo".into(),
            Arc::new(TokenSource::emulator()),
        );
        assert_eq!(
            auth.accounts_url(":lookup"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/projects/demo/accounts:lookup"
        );
        assert_eq!(
            auth.accounts_url(""),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/projects/demo/accounts"
        );
    }
}
