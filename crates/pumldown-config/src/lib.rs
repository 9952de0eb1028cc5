//! Configuration management for pumldown.
//!
//! Parses `pumldown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.java_path`
//! - `diagrams.plantuml_jar`
//! - `diagrams.remote_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pumldown.toml";

/// Default per-block render timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the diagram backend.
    pub backend: Option<BackendKind>,
    /// Override the remote renderer base URL.
    pub remote_url: Option<String>,
    /// Override the Java runtime used by the local backend.
    pub java_path: Option<PathBuf>,
    /// Override the `PlantUML` jar used by the local backend.
    pub plantuml_jar: Option<PathBuf>,
    /// Override the diagram cache flag.
    pub cache_enabled: Option<bool>,
}

/// Which diagram renderer to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Run the `PlantUML` engine as a local subprocess.
    #[default]
    Local,
    /// POST diagram source to a remote rendering service.
    Remote,
}

impl BackendKind {
    /// Name used in config files and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration (paths are relative strings from TOML).
    diagrams: DiagramsConfigRaw,
    /// Markdown rendering configuration.
    pub markdown: MarkdownConfig,

    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    backend: Option<BackendKind>,
    java_path: Option<String>,
    plantuml_jar: Option<String>,
    remote_url: Option<String>,
    timeout_secs: Option<u64>,
    cache: Option<bool>,
}

/// Resolved diagram backend configuration.
///
/// Immutable for the duration of a parse: documents take a snapshot and build
/// their backend from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramsConfig {
    /// Selected backend.
    pub backend: BackendKind,
    /// Java runtime for the local backend (looked up on `PATH` when bare).
    pub java_path: PathBuf,
    /// `PlantUML` jar for the local backend.
    pub plantuml_jar: PathBuf,
    /// Base URL of the remote renderer.
    pub remote_url: Option<String>,
    /// Per-block render timeout.
    pub timeout: Duration,
    /// Whether rendered blocks are memoized by content hash.
    pub cache_enabled: bool,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            java_path: PathBuf::from("java"),
            plantuml_jar: PathBuf::from("plantuml.jar"),
            remote_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_enabled: true,
        }
    }
}

/// Markdown rendering configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Emit `pragma-line-N` anchors before top-level blocks.
    pub line_markers: bool,
    /// Replace `:shortcode:` emoji.
    pub emoji: bool,
    /// Swallow a leading YAML front matter block.
    pub front_matter: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            line_markers: true,
            emoji: true,
            front_matter: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.remote_url`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_SERVER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pumldown.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, and the
    /// combined result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let diagrams = &mut self.diagrams_resolved;
        if let Some(backend) = settings.backend {
            diagrams.backend = backend;
        }
        if let Some(remote_url) = &settings.remote_url {
            diagrams.remote_url = Some(remote_url.clone());
        }
        if let Some(java_path) = &settings.java_path {
            diagrams.java_path.clone_from(java_path);
        }
        if let Some(plantuml_jar) = &settings.plantuml_jar {
            diagrams.plantuml_jar.clone_from(plantuml_jar);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            diagrams.cache_enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(&current)
    }

    /// Search for config file starting at `start` and walking up.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            diagrams_resolved: DiagramsConfig {
                plantuml_jar: base.join("plantuml.jar"),
                ..DiagramsConfig::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams_resolved;

        require_non_empty(
            &diagrams.java_path.to_string_lossy(),
            "diagrams.java_path",
        )?;

        if diagrams.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        if let Some(ref remote_url) = diagrams.remote_url {
            require_non_empty(remote_url, "diagrams.remote_url")?;
            require_http_url(remote_url, "diagrams.remote_url")?;
        } else if diagrams.backend == BackendKind::Remote {
            return Err(ConfigError::Validation(
                "diagrams.remote_url is required when backend = \"remote\"".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let diagrams = &mut self.diagrams;
        if let Some(ref java_path) = diagrams.java_path {
            diagrams.java_path = Some(expand::expand_env(java_path, "diagrams.java_path")?);
        }
        if let Some(ref jar) = diagrams.plantuml_jar {
            diagrams.plantuml_jar = Some(expand::expand_env(jar, "diagrams.plantuml_jar")?);
        }
        if let Some(ref url) = diagrams.remote_url {
            diagrams.remote_url = Some(expand::expand_env(url, "diagrams.remote_url")?);
        }
        Ok(())
    }

    /// Resolve the raw diagrams section against the config directory.
    ///
    /// `java_path` stays as written so a bare `java` is looked up on `PATH`;
    /// the jar is resolved relative to the config file.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.diagrams;
        let defaults = DiagramsConfig::default();

        self.diagrams_resolved = DiagramsConfig {
            backend: raw.backend.unwrap_or(defaults.backend),
            java_path: raw
                .java_path
                .as_deref()
                .map_or(defaults.java_path, PathBuf::from),
            plantuml_jar: config_dir.join(raw.plantuml_jar.as_deref().unwrap_or("plantuml.jar")),
            remote_url: raw.remote_url.clone(),
            timeout: raw
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            cache_enabled: raw.cache.unwrap_or(defaults.cache_enabled),
        };
    }
}
