use ureq::{Agent, AgentBuilder};

/// Non-success outcome of a `ureq` call.
#[derive(Debug)]
pub(crate) enum HttpFailure {
    Status { status: u16, body: String },
    Transport(String),
}

impl From<ureq::Error> for HttpFailure {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => HttpFailure::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => HttpFailure::Transport(transport.to_string()),
        }
    }
}

pub(crate) fn agent() -> Agent {
    AgentBuilder::new().build()
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
