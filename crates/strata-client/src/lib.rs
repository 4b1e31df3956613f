mod envelope;
mod error;
mod request;
mod transport;

pub use envelope::Envelope;
pub use error::ClientError;
pub use request::ApiContext;
pub use transport::{Transport, UreqTransport};
