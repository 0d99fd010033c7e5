//! tablesync core library: domain types and environment settings.
//!
//! Public API surface:
//! - [`types`]: newtypes, source rows, identity and profile records
//! - [`config`]: [`Settings`] loaded from the process environment
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::ConfigError;
pub use types::{
    Fields, IdentityRecord, NewIdentity, ProfileDocument, RecordId, RowContact, SourceRow, Uid,
    REQUIRED_ATTRIBUTES, UID_ATTRIBUTE,
};
