//! HTTP runtime: `/sync` runs one reconciliation pass, `/healthz` answers
//! liveness probes.

mod error;
pub mod routes;
mod runtime;

pub use error::ServerError;
pub use routes::router;
pub use runtime::{init_tracing, serve, serve_on, start_blocking};
