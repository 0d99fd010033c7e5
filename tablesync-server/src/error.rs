use std::net::SocketAddr;

use thiserror::Error;

/// Error surface for server startup and the accept loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error ({context}): {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] tablesync_core::ConfigError),

    #[error("firebase initialization failed: {0}")]
    Remote(#[from] tablesync_remote::RemoteError),
}

pub(crate) fn io_err(context: &'static str, source: std::io::Error) -> ServerError {
    ServerError::Io { context, source }
}
