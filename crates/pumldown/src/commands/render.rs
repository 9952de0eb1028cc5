//! `pumldown render` command implementation.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::common::CommonArgs;
use crate::buffer::TextBuffer;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit `{"success": ..., "html": ...}` JSON instead of bare HTML.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// JSON report for `--json`.
#[derive(Serialize)]
struct RenderReport<'a> {
    success: bool,
    html: &'a str,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// The result is written even when rendering fails, the error fragment
    /// taking the place of the document.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let buffer = TextBuffer::default();
        buffer.load(&self.input).map_err(|source| CliError::Read {
            path: self.input.clone(),
            source,
        })?;

        let mut document = self.common.document(&buffer, version, &output)?;
        document.parse();
        let result = document.result();

        let rendered = if self.json {
            let mut json = serde_json::to_string_pretty(&RenderReport {
                success: result.success,
                html: &result.html,
            })?;
            json.push('\n');
            json
        } else {
            result.html.clone()
        };

        if let Some(path) = &self.output {
            fs::write(path, &rendered)?;
            output.path("Output", path);
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }

        if result.success {
            output.success("Rendered successfully");
            Ok(())
        } else {
            Err(CliError::RenderFailed)
        }
    }
}
