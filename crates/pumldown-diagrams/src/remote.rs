//! Rendering through a remote PlantUML server over HTTP.

use std::time::Duration;

use ureq::Agent;

use crate::backend::{DiagramBackend, DiagramOutput};
use crate::consts::{DEFAULT_TIMEOUT, REMOTE_FAILURE_MARKER, REMOTE_RENDER_PATH};
use crate::error::DiagramErrorKind;

/// Create an HTTP agent with the given global timeout.
///
/// Non-2xx responses are returned as responses rather than errors.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Remote backend posting plain-text sources to `{base_url}/RenderFromPlain`.
///
/// A non-2xx reply renders as the literal `Error` for that block only;
/// transport failures are returned as errors.
#[derive(Clone)]
pub struct RemoteBackend {
    endpoint: String,
    agent: Agent,
}

impl RemoteBackend {
    /// Create a backend for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/{REMOTE_RENDER_PATH}", base_url.trim_end_matches('/')),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Full URL diagrams are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DiagramBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn render(&self, source: &str) -> Result<DiagramOutput, DiagramErrorKind> {
        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "text/plain; charset=utf-8")
            .send(source.as_bytes())
            .map_err(|e| DiagramErrorKind::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                url = %self.endpoint,
                "Remote renderer rejected diagram"
            );
            return Ok(DiagramOutput::Fallback(REMOTE_FAILURE_MARKER.to_owned()));
        }

        response
            .into_body()
            .read_to_string()
            .map(DiagramOutput::Rendered)
            .map_err(|e| DiagramErrorKind::Io(e.to_string()))
    }
}
