//! The node tree (spec §3.1): a closed, tagged-sum `Node` type with a
//! shared header (key, parent, version) and per-variant payloads.
//!
//! Grounded on `tree.rs`'s `Node { Leaf { spans, sums }, Internal {
//! children, sums } }` — same "closed variant set, no virtual dispatch"
//! design the spec's §9 design notes call for, generalized from two
//! span-level variants to the six document-level node variants.

pub mod element;
pub mod format;

use crate::frontend::TrailingNewlinePolicy;
use crate::key::NodeKey;
use crate::state::EditorState;
use element::ElementKind;
use format::{ElementFormatType, Direction, TextDetail, TextFormat, TextMode};
use std::sync::Arc;

pub trait DecoratorPayload: std::fmt::Debug {
    /// Text storage contributes this many UTF-16 code units for the
    /// decorator attachment. Spec default is exactly one (U+FFFC).
    fn attachment_text(&self) -> String {
        "\u{FFFC}".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RootNode {
    pub key: NodeKey,
    pub version: u64,
    pub children: Vec<NodeKey>,
}

#[derive(Debug, Clone)]
pub struct ElementNode {
    pub key: NodeKey,
    pub parent_key: Option<NodeKey>,
    pub version: u64,
    pub children: Vec<NodeKey>,
    pub kind: ElementKind,
    pub format: ElementFormatType,
    pub indent: u32,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone)]
pub struct TextNode {
    pub key: NodeKey,
    pub parent_key: Option<NodeKey>,
    pub version: u64,
    pub text: String,
    pub format: TextFormat,
    pub mode: TextMode,
    pub style: String,
    pub detail: TextDetail,
}

#[derive(Debug, Clone)]
pub struct LineBreakNode {
    pub key: NodeKey,
    pub parent_key: Option<NodeKey>,
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct DecoratorNode {
    pub key: NodeKey,
    pub parent_key: Option<NodeKey>,
    pub version: u64,
    pub payload: Arc<dyn DecoratorPayload>,
}

/// Preserves an unrecognized serialized node verbatim (spec §3.1, §4.8).
#[derive(Debug, Clone)]
pub struct UnknownNode {
    pub key: NodeKey,
    pub parent_key: Option<NodeKey>,
    pub version: u64,
    pub type_tag: String,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum Node {
    Root(RootNode),
    Element(ElementNode),
    Text(TextNode),
    LineBreak(LineBreakNode),
    Decorator(DecoratorNode),
    Unknown(UnknownNode),
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Root(n) => n.key,
            Node::Element(n) => n.key,
            Node::Text(n) => n.key,
            Node::LineBreak(n) => n.key,
            Node::Decorator(n) => n.key,
            Node::Unknown(n) => n.key,
        }
    }

    pub fn parent_key(&self) -> Option<NodeKey> {
        match self {
            Node::Root(_) => None,
            Node::Element(n) => n.parent_key,
            Node::Text(n) => n.parent_key,
            Node::LineBreak(n) => n.parent_key,
            Node::Decorator(n) => n.parent_key,
            Node::Unknown(n) => n.parent_key,
        }
    }

    pub fn set_parent_key(&mut self, parent: Option<NodeKey>) {
        match self {
            Node::Root(_) => {}
            Node::Element(n) => n.parent_key = parent,
            Node::Text(n) => n.parent_key = parent,
            Node::LineBreak(n) => n.parent_key = parent,
            Node::Decorator(n) => n.parent_key = parent,
            Node::Unknown(n) => n.parent_key = parent,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Node::Root(n) => n.version,
            Node::Element(n) => n.version,
            Node::Text(n) => n.version,
            Node::LineBreak(n) => n.version,
            Node::Decorator(n) => n.version,
            Node::Unknown(n) => n.version,
        }
    }

    pub fn bump_version(&mut self) {
        let v = match self {
            Node::Root(n) => &mut n.version,
            Node::Element(n) => &mut n.version,
            Node::Text(n) => &mut n.version,
            Node::LineBreak(n) => &mut n.version,
            Node::Decorator(n) => &mut n.version,
            Node::Unknown(n) => &mut n.version,
        };
        *v += 1;
    }

    pub fn type_tag(&self) -> &str {
        match self {
            Node::Root(_) => "root",
            Node::Element(n) => n.kind.type_tag(),
            Node::Text(_) => "text",
            Node::LineBreak(_) => "linebreak",
            Node::Decorator(_) => "decorator",
            Node::Unknown(n) => n.type_tag.as_str(),
        }
    }

    /// Children keys, for node types that have them. Leaves return an
    /// empty slice.
    pub fn children(&self) -> &[NodeKey] {
        match self {
            Node::Root(n) => &n.children,
            Node::Element(n) => &n.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeKey>> {
        match self {
            Node::Root(n) => Some(&mut n.children),
            Node::Element(n) => Some(&mut n.children),
            _ => None,
        }
    }

    pub fn is_element_like(&self) -> bool {
        matches!(self, Node::Root(_) | Node::Element(_))
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_element_like()
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match self {
            Node::Text(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Node::Element(n) => Some(n),
            _ => None,
        }
    }

    /// Number of UTF-16 code units of `text`'s own leaf payload (not
    /// counting preamble/postamble, which the reconciler derives
    /// separately from node type and position).
    pub fn text_length_utf16(&self) -> u32 {
        match self {
            Node::Text(n) => n.text.encode_utf16().count() as u32,
            Node::Decorator(n) => n.payload.attachment_text().encode_utf16().count() as u32,
            _ => 0,
        }
    }

    /// `(preamble, text, postamble)` this node contributes to flat text
    /// storage on its own, excluding any descendant's contribution (spec
    /// §3.1's `RangeCacheItem`, reconciler §4.4/§4.5). An Element's
    /// postamble depends on tree position (is another block next?) and
    /// host policy (is this the document's end?), neither of which this
    /// node has access to on its own — callers needing an Element's real
    /// postamble use `block_postamble` instead; the postamble returned
    /// here for `Element` is always empty.
    pub fn content_parts(&self) -> (String, String, String) {
        match self {
            Node::Root(_) => (String::new(), String::new(), String::new()),
            Node::Element(_) => (String::new(), String::new(), String::new()),
            Node::Text(t) => (String::new(), t.text.clone(), String::new()),
            Node::LineBreak(_) => ("\n".to_string(), String::new(), String::new()),
            Node::Decorator(d) => (d.payload.attachment_text(), String::new(), String::new()),
            Node::Unknown(_) => (String::new(), String::new(), String::new()),
        }
    }
}

/// The trailing-newline postamble a block-level Element contributes to
/// flat storage (spec §6): present whenever another block follows
/// anywhere downstream of `key` in the document, climbing through
/// ancestors past the end of each one's own child list; absent for the
/// node that genuinely ends the document unless `policy` asks for a
/// trailing terminator there. `List` is purely structural and never
/// contributes one itself — its `ListItem` children each decide their
/// own via this same function.
pub fn block_postamble(pending: &EditorState, key: NodeKey, kind: &ElementKind, policy: TrailingNewlinePolicy) -> String {
    if matches!(kind, ElementKind::List { .. }) {
        return String::new();
    }
    if has_following_content(pending, key) {
        "\n".to_string()
    } else {
        match policy {
            TrailingNewlinePolicy::Omit => String::new(),
            TrailingNewlinePolicy::Always => "\n".to_string(),
        }
    }
}

/// Whether there is more content anywhere after `key` in document
/// order: a later sibling under `key`'s own parent, or (if `key` is its
/// parent's last child) a later sibling of some ancestor, all the way up
/// to Root.
fn has_following_content(pending: &EditorState, mut key: NodeKey) -> bool {
    loop {
        let node = match pending.node(key) {
            Some(n) => n.as_ref(),
            None => return false,
        };
        let Some(parent_key) = node.parent_key() else {
            return false;
        };
        let Some(parent) = pending.node(parent_key) else {
            return false;
        };
        if let Some(pos) = parent.children().iter().position(|&c| c == key) {
            if pos + 1 < parent.children().len() {
                return true;
            }
        }
        key = parent_key;
    }
}

/// Whether two Text nodes are eligible to merge under normalization
/// (spec invariant 8): same format, mode, style, and both mergeable
/// (mode not token/segmented).
pub fn text_nodes_mergeable(a: &TextNode, b: &TextNode) -> bool {
    a.mode.is_mergeable() && b.mode.is_mergeable() && a.format == b.format && a.mode == b.mode && a.style == b.style
}
