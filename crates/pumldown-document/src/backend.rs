//! Diagram backend construction from configuration.

use std::sync::Arc;

use pumldown_config::{BackendKind, DiagramsConfig};
use pumldown_diagrams::{DiagramBackend, LocalBackend, RemoteBackend};

use crate::error::PipelineError;

/// Build the backend described by `config`.
pub fn backend_from_config(
    config: &DiagramsConfig,
) -> Result<Arc<dyn DiagramBackend>, PipelineError> {
    let backend: Arc<dyn DiagramBackend> = match config.backend {
        BackendKind::Local => Arc::new(
            LocalBackend::new(&config.java_path)
                .jar(&config.plantuml_jar)
                .timeout(config.timeout),
        ),
        BackendKind::Remote => {
            let url = config
                .remote_url
                .as_deref()
                .ok_or(PipelineError::MissingRemoteUrl)?;
            Arc::new(RemoteBackend::new(url).timeout(config.timeout))
        }
    };
    Ok(backend)
}
