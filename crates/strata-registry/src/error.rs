use std::fmt;

#[derive(Debug)]
pub enum RegistryError {
    Client(strata_client::ClientError),
    /// The service answered `ok: false`; carries the server-supplied message.
    Service(String),
    /// The response body was not a valid envelope or payload.
    Envelope(String),
    Schema(strata_schema::SchemaError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Client(e) => write!(f, "client error: {e}"),
            RegistryError::Service(msg) => write!(f, "schema service error: {msg}"),
            RegistryError::Envelope(msg) => write!(f, "malformed response: {msg}"),
            RegistryError::Schema(e) => write!(f, "schema error: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<strata_client::ClientError> for RegistryError {
    fn from(e: strata_client::ClientError) -> Self {
        RegistryError::Client(e)
    }
}

impl From<strata_schema::SchemaError> for RegistryError {
    fn from(e: strata_schema::SchemaError) -> Self {
        RegistryError::Schema(e)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        RegistryError::Envelope(e.to_string())
    }
}
