//! Firebase Auth and Cloud Firestore over their REST APIs.
//!
//! [`FirebaseApp::initialize`] is the single setup step: it decodes the
//! service account, builds one shared token source and both clients. When an
//! emulator host is configured the matching client talks plain HTTP to it
//! with the static `owner` bearer instead.

mod auth;
mod credentials;
mod firestore;
mod token;

use std::sync::Arc;

use tablesync_core::Settings;

use crate::error::RemoteError;
use crate::http;

pub use auth::{classify_error, FirebaseAuth, IDENTITY_TOOLKIT_URL};
pub use credentials::{ServiceAccount, DEFAULT_TOKEN_URI};
pub use firestore::{Firestore, FIRESTORE_URL};
pub use token::{TokenSource, EMULATOR_TOKEN, SCOPES};

/// Initialized Firebase clients sharing one credential.
pub struct FirebaseApp {
    pub auth: Arc<FirebaseAuth>,
    pub firestore: Arc<Firestore>,
}

impl FirebaseApp {
    pub fn initialize(settings: &Settings) -> Result<Self, RemoteError> {
        let account = ServiceAccount::from_base64(&settings.firebase_service_account_base64)?;
        let project_id = account.project_id.clone();
        let agent = http::agent();
        let live = Arc::new(TokenSource::service_account(account, agent.clone()));
        let emulator = Arc::new(TokenSource::emulator());

        let auth = match settings.firebase_auth_emulator_host.as_deref() {
            Some(host) => FirebaseAuth::new(
                agent.clone(),
                format!("http://{host}/identitytoolkit.googleapis.com"),
                project_id.clone(),
                emulator.clone(),
            ),
            None => FirebaseAuth::new(
                agent.clone(),
                IDENTITY_TOOLKIT_URL,
                project_id.clone(),
                live.clone(),
            ),
        };

        let firestore = match settings.firestore_emulator_host.as_deref() {
            Some(host) => Firestore::new(
                agent,
                format!("http://{host}"),
                project_id.clone(),
                settings.profile_collection.clone(),
                emulator,
            ),
            None => Firestore::new(
                agent,
                FIRESTORE_URL,
                project_id.clone(),
                settings.profile_collection.clone(),
                live,
            ),
        };

        tracing::info!(
            project_id = %project_id,
            collection = %settings.profile_collection,
            auth_emulator = settings.firebase_auth_emulator_host.is_some(),
            firestore_emulator = settings.firestore_emulator_host.is_some(),
            "firebase initialized",
        );

        Ok(Self {
            auth: Arc::new(auth),
            firestore: Arc::new(firestore),
        })
    }
}
