//! Diagram block extraction and rendering for Markdown documents.
//!
//! Diagram blocks (`@startuml ... @enduml` and friends) are cut out of the
//! Markdown text before compilation and replaced with HTML comment markers.
//! After the Markdown is compiled, each block is rendered to SVG by a
//! [`DiagramBackend`] and spliced back in place of its marker.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use pumldown_diagrams::{
//!     DiagramBackend, DiagramErrorKind, DiagramOutput, DiagramRenderer, PlaceholderExtractor,
//!     substitute,
//! };
//!
//! struct Static;
//!
//! impl DiagramBackend for Static {
//!     fn name(&self) -> &'static str {
//!         "static"
//!     }
//!
//!     fn render(&self, _source: &str) -> Result<DiagramOutput, DiagramErrorKind> {
//!         Ok(DiagramOutput::Rendered("<svg/>".to_owned()))
//!     }
//! }
//!
//! let extraction = PlaceholderExtractor::plantuml().extract("@startuml\nA -> B\n@enduml");
//! assert!(extraction.text.starts_with("<!--- PlantUML:"));
//!
//! let renderer = DiagramRenderer::new(Arc::new(Static));
//! let rendered = renderer.render_all(&extraction.blocks).unwrap();
//! assert_eq!(substitute(&extraction.text, &rendered).unwrap(), "<svg/>");
//! ```
//!
//! # Backends
//!
//! - [`LocalBackend`]: runs PlantUML through a local Java runtime
//! - [`RemoteBackend`]: posts sources to a PlantUML server over HTTP

mod backend;
mod cache;
pub mod consts;
mod error;
mod extract;
mod language;
mod local;
mod remote;
mod render;

pub use backend::{DiagramBackend, DiagramOutput};
pub use cache::DiagramKey;
pub use error::{DiagramError, DiagramErrorKind};
pub use extract::{Extraction, PlaceholderExtractor, PlaceholderMap, placeholder_marker};
pub use language::{DiagramBlock, DiagramKind, TagPair};
pub use local::LocalBackend;
pub use remote::{RemoteBackend, create_agent};
pub use render::{DiagramRenderer, RenderedDiagram, substitute};
