//! Error types for tablesync-core.

use thiserror::Error;

/// All errors that can arise while loading [`crate::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The environment could not be extracted into settings (bad port, etc.).
    #[error("failed to load configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A required variable is unset or blank.
    #[error("missing required setting {0}")]
    Missing(&'static str),
}
