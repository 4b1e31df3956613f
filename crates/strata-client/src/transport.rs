use std::sync::Arc;

use http::{Request, Response};

use crate::error::ClientError;

/// Seam between the service layer and the network. Implementations must
/// return non-2xx responses as responses, not errors — the document client
/// inspects status codes to drive verb negotiation.
pub trait Transport: Send + Sync {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, ClientError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, ClientError> {
        (**self).send(req)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, ClientError> {
        (**self).send(req)
    }
}

/// Blocking HTTP transport backed by a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Statuses come back as responses so 405 can trigger verb fallback.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, ClientError> {
        let res = self.agent.run(req)?;
        let (parts, mut body) = res.into_parts();
        let bytes = body.read_to_vec()?;
        Ok(Response::from_parts(parts, bytes))
    }
}
