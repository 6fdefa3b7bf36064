//! Accent- and case-insensitive sidebar search.
//!
//! "Cafe" matches a node titled "Café Crème": both sides are lowercased,
//! decomposed to NFD, and stripped of combining diacritical marks before a
//! substring test.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Fold `text` for comparison: lowercase, NFD, combining marks removed.
#[must_use]
pub fn normalize_search_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect()
}

/// Whether a node titled `node_text` matches the typed `query`.
///
/// An empty query matches everything.
#[must_use]
pub fn sidebar_matches(query: &str, node_text: &str) -> bool {
    normalize_search_text(node_text).contains(&normalize_search_text(query))
}

/// A sidebar node and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarNode {
    /// Node id.
    pub id: String,
    /// Caption shown in the sidebar.
    #[serde(default)]
    pub text: String,
    /// Child nodes.
    #[serde(default)]
    pub nodes: Vec<SidebarNode>,
}

impl SidebarNode {
    /// A leaf node.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            nodes: Vec::new(),
        }
    }

    /// Attach children.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<Self>) -> Self {
        self.nodes = nodes;
        self
    }
}

/// Ids of every node in the tree (all levels, expanded) matching `query`,
/// depth-first in display order.
#[must_use]
pub fn search_tree<'a>(nodes: &'a [SidebarNode], query: &str) -> Vec<&'a str> {
    fn walk<'a>(nodes: &'a [SidebarNode], query: &str, out: &mut Vec<&'a str>) {
        for node in nodes {
            if normalize_search_text(&node.text).contains(query) {
                out.push(&node.id);
            }
            walk(&node.nodes, query, out);
        }
    }

    let query = normalize_search_text(query);
    let mut out = Vec::new();
    walk(nodes, &query, &mut out);
    out
}
