//! # tablesync-remote
//!
//! Network implementations of the `tablesync-job` collaborator traits:
//!
//! - [`aitable::AitableClient`] implements [`tablesync_job::TableSource`]
//! - [`firebase::FirebaseAuth`] implements [`tablesync_job::IdentityProvider`]
//! - [`firebase::Firestore`] implements [`tablesync_job::DocumentStore`]
//!
//! [`build_job`] wires all three from [`Settings`].

pub mod aitable;
pub mod error;
pub mod firebase;
mod http;

use std::sync::Arc;

use tablesync_core::Settings;
use tablesync_job::RecordSyncJob;

pub use aitable::AitableClient;
pub use error::RemoteError;
pub use firebase::{FirebaseApp, FirebaseAuth, Firestore, ServiceAccount, TokenSource};

/// Initialize Firebase once and assemble a job over the live services.
pub fn build_job(settings: &Settings) -> Result<RecordSyncJob, RemoteError> {
    let app = FirebaseApp::initialize(settings)?;
    let table = AitableClient::from_settings(settings);
    Ok(RecordSyncJob::new(
        Arc::new(table),
        app.auth.clone(),
        app.firestore.clone(),
    ))
}
