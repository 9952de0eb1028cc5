//! Diagram block kinds and their delimiting tags.

/// Diagram families recognised in Markdown text, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Uml,
    MindMap,
    Gantt,
    Wbs,
    Json,
}

impl DiagramKind {
    /// Every kind, in the order extraction passes run.
    pub const ALL: [Self; 5] = [Self::Uml, Self::MindMap, Self::Gantt, Self::Wbs, Self::Json];

    /// Tag that opens a block of this kind.
    #[must_use]
    pub fn start_tag(self) -> &'static str {
        match self {
            Self::Uml => "@startuml",
            Self::MindMap => "@startmindmap",
            Self::Gantt => "@startgantt",
            Self::Wbs => "@startwbs",
            Self::Json => "@startjson",
        }
    }

    /// Tag that closes a block of this kind.
    #[must_use]
    pub fn end_tag(self) -> &'static str {
        match self {
            Self::Uml => "@enduml",
            Self::MindMap => "@endmindmap",
            Self::Gantt => "@endgantt",
            Self::Wbs => "@endwbs",
            Self::Json => "@endjson",
        }
    }

    /// Start/end tag pair for this kind.
    #[must_use]
    pub fn tag_pair(self) -> TagPair {
        TagPair::new(self.start_tag(), self.end_tag())
    }
}

/// A start/end tag pair delimiting diagram blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    /// Opening tag, e.g. `@startuml`.
    pub start: String,
    /// Closing tag, e.g. `@enduml`.
    pub end: String,
}

impl TagPair {
    /// Create a tag pair.
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A diagram block cut out of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Unique key: first-line label plus a random hex suffix.
    pub key: String,
    /// Full original block text, tags included.
    pub source: String,
}
