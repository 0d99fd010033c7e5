use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use tablesync_core::Settings;
use tablesync_job::RecordSyncJob;

use crate::error::{io_err, ServerError};
use crate::routes;

/// Load settings, start a multi-thread runtime and serve until ctrl-c.
///
/// `port` overrides the configured `PORT` when given.
pub fn start_blocking(port: Option<u16>) -> Result<(), ServerError> {
    init_tracing();
    let mut settings = Settings::from_env()?;
    if let Some(port) = port {
        settings.port = port;
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio runtime", e))?;
    runtime.block_on(serve(settings))
}

/// Initialize Firebase, bind `0.0.0.0:{port}` and serve.
///
/// Credentials are decoded before the listener is bound, so a bad service
/// account stops startup instead of failing every request.
pub async fn serve(settings: Settings) -> Result<(), ServerError> {
    tracing::debug!(settings = ?settings, "loaded settings");
    let job = Arc::new(tablesync_remote::build_job(&settings)?);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve_on(listener, job).await
}

/// Serve the routes on an already bound listener until ctrl-c.
pub async fn serve_on(listener: TcpListener, job: Arc<RecordSyncJob>) -> Result<(), ServerError> {
    let addr = listener
        .local_addr()
        .map_err(|e| io_err("listener address", e))?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, routes::router(job))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| io_err("accept loop", e))?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down server"),
        Err(err) => tracing::error!(error = %err, "ctrl-c handler failed"),
    }
}

/// Install the fmt subscriber on stderr. `RUST_LOG` wins over the `info`
/// default.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
