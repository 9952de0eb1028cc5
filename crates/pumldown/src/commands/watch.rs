//! `pumldown watch` command implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Args;
use notify::{EventKind, RecursiveMode, Watcher};
use pumldown_document::{SharedDocument, share, spawn_parse};

use super::common::CommonArgs;
use crate::buffer::TextBuffer;
use crate::debouncer::ChangeDebouncer;
use crate::error::CliError;
use crate::output::Output;

/// Quiet period before a burst of file events triggers a re-parse.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Interval between debouncer checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Markdown file to watch.
    input: PathBuf,

    /// HTML file rewritten after every successful parse.
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl WatchArgs {
    /// Execute the watch command. Runs until the process is interrupted.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let input = fs::canonicalize(&self.input).map_err(|source| CliError::Read {
            path: self.input.clone(),
            source,
        })?;

        let buffer = TextBuffer::default();
        buffer.load(&input).map_err(|source| CliError::Read {
            path: input.clone(),
            source,
        })?;

        let mut document = self.common.document(&buffer, version, &output)?;
        let target = self.output.clone();
        document.on_parsed(move |doc| write_preview(&target, doc.parsed_result()));
        let document = share(document);

        // First render runs in the foreground so startup errors show up before watching
        parse_now(&document, &output);

        let debouncer = Arc::new(ChangeDebouncer::new(DEBOUNCE));
        let debouncer_for_watcher = Arc::clone(&debouncer);
        let file_name = input.file_name().map(ToOwned::to_owned);

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "File watcher error");
                        return;
                    }
                };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                // Editors that save by rename touch sibling temp files too
                if event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(ToOwned::to_owned) == file_name)
                {
                    debouncer_for_watcher.record();
                }
            })?;

        let watch_dir = input.parent().unwrap_or_else(|| Path::new("."));
        watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

        output.path("Watching", &input);
        output.path("Preview", &self.output);

        loop {
            thread::sleep(POLL_INTERVAL);
            if !debouncer.take_ready() {
                continue;
            }
            match buffer.load(&input) {
                Ok(()) => spawn_parse(&document),
                Err(e) => output.warning(&format!("Skipping change, failed to read input: {e}")),
            }
        }
    }
}

/// Parse on the current thread and report the outcome.
fn parse_now(document: &SharedDocument, output: &Output) {
    let mut document = document
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    document.parse();
    if document.success() {
        output.success("Initial render complete");
    } else {
        output.error("Initial render failed, see log for details");
    }
}

fn write_preview(path: &Path, html: &str) {
    match fs::write(path, html) {
        Ok(()) => tracing::info!(path = %path.display(), "Preview updated"),
        Err(e) => tracing::error!(error = %e, path = %path.display(), "Failed to write preview"),
    }
}
