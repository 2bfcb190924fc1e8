//! Element node subvariants (spec §3.1): paragraph, heading, quote, code
//! block, list, list-item, and open-ended user-defined block/inline
//! elements.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListType {
    Bullet,
    Number,
    Check,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Paragraph,
    Heading { level: u8 },
    Quote,
    CodeBlock { language: Option<String> },
    List { list_type: ListType, start: u32 },
    ListItem { value: u32, checked: Option<bool> },
    /// Escape hatch for user-defined block/inline elements the core
    /// doesn't need to special-case; carries its own type tag.
    Generic(String),
}

impl ElementKind {
    pub fn type_tag(&self) -> &str {
        match self {
            ElementKind::Paragraph => "paragraph",
            ElementKind::Heading { .. } => "heading",
            ElementKind::Quote => "quote",
            ElementKind::CodeBlock { .. } => "code-block",
            ElementKind::List { .. } => "list",
            ElementKind::ListItem { .. } => "list-item",
            ElementKind::Generic(tag) => tag.as_str(),
        }
    }

    /// Whether `preUpdate`/`postUpdate` normalization hooks apply to this
    /// subvariant (spec §4.1: list-item and code block rewrite
    /// structure during normalization).
    pub fn has_structural_hooks(&self) -> bool {
        matches!(self, ElementKind::ListItem { .. } | ElementKind::CodeBlock { .. } | ElementKind::List { .. })
    }
}
