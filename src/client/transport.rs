use super::api::{HttpRequest, HttpResponse};
use super::error::ClientError;

/// Performs one HTTP round-trip. Non-2xx statuses are data, not errors.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Blocking transport over `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self { Self::new() }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let HttpRequest { method, url, body } = request;
        let sent = match (method.as_str(), body) {
            ("GET", _) => self.agent.get(&url).call(),
            ("DELETE", _) => self.agent.delete(&url).call(),
            ("POST", Some(body)) => self.agent.post(&url).content_type("application/json").send(body.as_bytes()),
            ("POST", None) => self.agent.post(&url).send_empty(),
            ("PUT", Some(body)) => self.agent.put(&url).content_type("application/json").send(body.as_bytes()),
            ("PUT", None) => self.agent.put(&url).send_empty(),
            (other, _) => return Err(ClientError::Transport(format!("unsupported method {other}"))),
        };
        let mut response = sent.map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
