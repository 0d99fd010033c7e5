use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use tablesync_job::{pipeline, RecordSyncJob};

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

/// `/sync` accepts any method; the caller is typically a scheduler or a
/// table automation webhook.
pub fn router(job: Arc<RecordSyncJob>) -> Router {
    Router::new()
        .route("/sync", any(sync))
        .route("/healthz", get(healthz))
        .with_state(job)
}

async fn sync(State(job): State<Arc<RecordSyncJob>>) -> (StatusCode, Json<Value>) {
    match tokio::task::spawn_blocking(move || pipeline::run(&job)).await {
        Ok(reply) if reply.ok => (StatusCode::OK, Json(reply.body)),
        Ok(reply) => (StatusCode::INTERNAL_SERVER_ERROR, Json(reply.body)),
        Err(err) => {
            tracing::error!(error = %err, "sync task join failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("sync task join failure: {err}") })),
            )
        }
    }
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}
