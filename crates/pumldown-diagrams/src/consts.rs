//! Internal constants for diagram extraction and rendering.

use std::time::Duration;

/// Default timeout for a single diagram render (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opening text of a placeholder marker, up to the block key.
pub const PLACEHOLDER_PREFIX: &str = "<!--- PlantUML:";

/// Closing text of a placeholder marker.
pub const PLACEHOLDER_SUFFIX: &str = " -->";

/// Number of random hex characters appended to every block key.
pub const KEY_SUFFIX_LEN: usize = 8;

/// Path, relative to the remote base URL, that accepts plain-text diagrams.
pub const REMOTE_RENDER_PATH: &str = "RenderFromPlain";

/// Content substituted for a block the remote renderer refused.
pub const REMOTE_FAILURE_MARKER: &str = "Error";
