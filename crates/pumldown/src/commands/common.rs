//! Flags shared by all commands and document construction from them.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use pumldown_cache::FileCache;
use pumldown_config::{BackendKind, CliSettings, Config};
use pumldown_document::{Document, markdown_pipeline};

use crate::buffer::TextBuffer;
use crate::error::CliError;
use crate::output::Output;

/// Diagram backend selectable on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum BackendArg {
    /// Local `PlantUML` jar run through Java.
    Local,
    /// Remote `PlantUML` server.
    Remote,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Local => Self::Local,
            BackendArg::Remote => Self::Remote,
        }
    }
}

/// Arguments shared by `render` and `watch`.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover pumldown.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagram backend (overrides config).
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Remote renderer base URL (overrides config).
    #[arg(long, env = "PUMLDOWN_REMOTE_URL")]
    remote_url: Option<String>,

    /// Java runtime for the local backend (overrides config).
    #[arg(long, env = "PUMLDOWN_JAVA")]
    java: Option<PathBuf>,

    /// `PlantUML` jar for the local backend (overrides config).
    #[arg(long, env = "PUMLDOWN_PLANTUML_JAR")]
    jar: Option<PathBuf>,

    /// Disable diagram caching.
    #[arg(long)]
    no_cache: bool,

    /// Persist rendered diagrams in this directory between runs.
    #[arg(long, conflicts_with = "no_cache")]
    cache_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration with the command-line overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            backend: self.backend.map(BackendKind::from),
            remote_url: self.remote_url.clone(),
            java_path: self.java.clone(),
            plantuml_jar: self.jar.clone(),
            cache_enabled: self.no_cache.then_some(false),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Build a document reading from `buffer`.
    pub(crate) fn document(
        &self,
        buffer: &TextBuffer,
        version: &str,
        output: &Output,
    ) -> Result<Document, CliError> {
        let config = self.load_config()?;
        let diagrams = config.diagrams_resolved;

        if let Some(path) = &config.config_path {
            output.path("Config", path);
        }
        match diagrams.backend {
            BackendKind::Local => output.info(&format!(
                "Diagrams: local ({} -jar {})",
                diagrams.java_path.display(),
                diagrams.plantuml_jar.display()
            )),
            BackendKind::Remote => output.info(&format!(
                "Diagrams: remote ({})",
                diagrams.remote_url.as_deref().unwrap_or_default()
            )),
        }

        let pipeline = Arc::new(markdown_pipeline(config.markdown));
        let source = buffer.clone();
        let mut document = Document::new(move || source.text(), pipeline, diagrams);

        if let Some(cache_dir) = &self.cache_dir {
            output.path("Cache directory", cache_dir);
            document = document.with_cache(Arc::new(FileCache::new(cache_dir.clone(), version)));
        }

        Ok(document)
    }
}
