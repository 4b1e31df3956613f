use std::fmt;

use http::{Method, StatusCode};

#[derive(Debug)]
pub enum DocError {
    Client(strata_client::ClientError),
    /// The service rejected the request; carries status and server message.
    Service {
        status: StatusCode,
        message: String,
    },
    /// The response body was not a valid envelope.
    Envelope(String),
    /// Every write verb was tried and failed. Carries the verbs in the order
    /// they were attempted plus the last failure's message.
    VerbsExhausted {
        attempted: Vec<Method>,
        message: String,
    },
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocError::Client(e) => write!(f, "client error: {e}"),
            DocError::Service { status, message } => {
                write!(f, "document service error ({status}): {message}")
            }
            DocError::Envelope(msg) => write!(f, "malformed response: {msg}"),
            DocError::VerbsExhausted { attempted, message } => {
                let verbs: Vec<&str> = attempted.iter().map(|m| m.as_str()).collect();
                write!(
                    f,
                    "all write verbs failed (tried {}): {message}",
                    verbs.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for DocError {}

impl From<strata_client::ClientError> for DocError {
    fn from(e: strata_client::ClientError) -> Self {
        DocError::Client(e)
    }
}
