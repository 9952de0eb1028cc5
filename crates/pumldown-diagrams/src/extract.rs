//! Placeholder extraction of diagram blocks.
//!
//! Each `start ... end` block in the Markdown text is replaced by an HTML
//! comment marker `<!--- PlantUML:{key} -->`. The block source is kept in a
//! [`PlaceholderMap`] under the same key, so the rendered diagram can be
//! spliced into the HTML after Markdown compilation.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::LazyLock;

use regex::Regex;

use crate::consts::{KEY_SUFFIX_LEN, PLACEHOLDER_PREFIX, PLACEHOLDER_SUFFIX};
use crate::language::{DiagramBlock, DiagramKind, TagPair};

static PLANTUML_EXTRACTOR: LazyLock<PlaceholderExtractor> = LazyLock::new(|| {
    PlaceholderExtractor::new(DiagramKind::ALL.map(DiagramKind::tag_pair)).unwrap()
});

/// Build the placeholder marker for a block key.
#[must_use]
pub fn placeholder_marker(key: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{key}{PLACEHOLDER_SUFFIX}")
}

/// Extracted diagram sources keyed by placeholder key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    blocks: HashMap<String, String>,
}

impl PlaceholderMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Source of the block stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.blocks.get(key).map(String::as_str)
    }

    /// Whether a block is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.blocks.contains_key(key)
    }

    /// Add a block. An existing block with the same key is replaced.
    pub fn insert(&mut self, block: DiagramBlock) {
        self.blocks.insert(block.key, block.source);
    }

    /// Iterate over `(key, source)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consume the map into its blocks, in arbitrary order.
    #[must_use]
    pub fn into_blocks(self) -> Vec<DiagramBlock> {
        self.blocks
            .into_iter()
            .map(|(key, source)| DiagramBlock { key, source })
            .collect()
    }

    pub(crate) fn as_map(&self) -> &HashMap<String, String> {
        &self.blocks
    }
}

impl IntoIterator for PlaceholderMap {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

/// Result of [`PlaceholderExtractor::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Text with every block replaced by its marker.
    pub text: String,
    /// Block sources keyed by marker key.
    pub blocks: PlaceholderMap,
}

/// Replaces diagram blocks with placeholder markers.
///
/// Tag pairs run in order; each pass scans the text produced by the previous
/// one. Matching is non-greedy and spans newlines, so an unterminated block
/// is left untouched.
#[derive(Debug, Clone)]
pub struct PlaceholderExtractor {
    passes: Vec<(TagPair, Regex)>,
}

impl PlaceholderExtractor {
    /// Create an extractor for the given tag pairs, applied in order.
    pub fn new(pairs: impl IntoIterator<Item = TagPair>) -> Result<Self, regex::Error> {
        let passes = pairs
            .into_iter()
            .map(|pair| {
                let pattern = format!(
                    "(?s){}.*?{}",
                    regex::escape(&pair.start),
                    regex::escape(&pair.end)
                );
                Regex::new(&pattern).map(|re| (pair, re))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { passes })
    }

    /// Shared extractor for the PlantUML tag pairs: uml, mindmap, gantt, wbs, json.
    #[must_use]
    pub fn plantuml() -> &'static Self {
        &PLANTUML_EXTRACTOR
    }

    /// Replace every block in `text` with a marker and collect the sources.
    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        let mut blocks = PlaceholderMap::new();
        let mut current = Cow::Borrowed(text);

        for (pair, re) in &self.passes {
            let rewritten = match extract_pass(re, &pair.start, &current, &mut blocks) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(rewritten) => rewritten,
            };
            current = Cow::Owned(rewritten);
        }

        if !blocks.is_empty() {
            tracing::debug!(count = blocks.len(), "Extracted diagram blocks");
        }

        Extraction {
            text: current.into_owned(),
            blocks,
        }
    }
}

/// Run one tag pair over `text`. Returns the input borrowed when nothing matched.
fn extract_pass<'t>(
    re: &Regex,
    start_tag: &str,
    text: &'t str,
    blocks: &mut PlaceholderMap,
) -> Cow<'t, str> {
    if !re.is_match(text) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for m in re.find_iter(text) {
        result.push_str(&text[last_end..m.start()]);

        let source = m.as_str();
        let key = unique_key(start_tag, source, blocks);
        result.push_str(&placeholder_marker(&key));
        blocks.insert(DiagramBlock {
            key,
            source: source.to_owned(),
        });

        last_end = m.end();
    }
    result.push_str(&text[last_end..]);

    Cow::Owned(result)
}

/// Key for a block: its first line without the start tag, reduced to a
/// marker-safe label, plus a random hex suffix. Redrawn on the rare
/// collision with an existing key.
fn unique_key(start_tag: &str, source: &str, blocks: &PlaceholderMap) -> String {
    let first_line = source.lines().next().unwrap_or_default();
    let label = marker_label(&first_line.replace(start_tag, ""));

    loop {
        let key = format!("{label}{}", random_suffix());
        if !blocks.contains_key(&key) {
            return key;
        }
    }
}

/// Keep alphanumerics, `_` and `.`; collapse every other run to one `_`.
///
/// Markers inside a paragraph are parsed as inline HTML comments, so a
/// label must never carry `-`, `>` or `<` into the marker.
fn marker_label(raw: &str) -> String {
    let mut label = String::with_capacity(raw.len());
    let mut gap = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            if gap && !label.is_empty() {
                label.push('_');
            }
            label.push(c);
            gap = false;
        } else {
            gap = true;
        }
    }
    label
}

fn random_suffix() -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(KEY_SUFFIX_LEN);
    suffix
}
