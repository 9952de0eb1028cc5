//! Diagnostics sinks for pipeline failures.

use crate::error::PipelineError;

/// Receives pipeline failures for logging.
///
/// Reporting is fire-and-forget: implementations must not block for long
/// and cannot fail back into the pipeline.
pub trait DiagnosticsSink: Send + Sync {
    /// Record a failed parse cycle.
    fn report(&self, error: &PipelineError);
}

/// Default sink, logging through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, error: &PipelineError) {
        tracing::error!(error = %error.report(), "Document parse failed");
    }
}
