//! Per-identity credential generation.

use rand::{distributions::Alphanumeric, Rng};

pub const PASSWORD_LEN: usize = 24;

/// Fresh random password for a newly created identity.
///
/// Drawn from the thread-local CSPRNG. Callers must not log or persist it.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}
