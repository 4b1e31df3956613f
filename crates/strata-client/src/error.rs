use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response (connect, DNS, TLS, I/O).
    Transport(String),
    /// The request could not be built.
    Request(http::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::Request(e) => write!(f, "request build error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<http::Error> for ClientError {
    fn from(e: http::Error) -> Self {
        ClientError::Request(e)
    }
}

impl From<ureq::Error> for ClientError {
    fn from(e: ureq::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
