//! `EditorState`/`Node` (de)serialization (spec §4.8).
//!
//! Grounded on `timabell-markdown-neuraxis`'s `serde`-derived model types
//! (one tagged record per node kind, children embedded recursively) and
//! `knitli-thread`'s `serde_json` usage with the `preserve_order` feature
//! so object key order survives a round-trip through a host's file.
//!
//! Keys are per-session identifiers (`NodeKey::raw` is only meaningful
//! within one `Editor`), so they never appear in the serialized form.
//! `from_json` mints fresh keys via `Editor::allocate_key` as it walks
//! the record tree back into a node map.

use crate::editor::Editor;
use crate::error::{EditorError, EditorResult};
use crate::key::{NodeKey, ROOT_KEY};
use crate::node::element::ElementKind;
use crate::node::format::{Direction, ElementFormatType, TextDetail, TextFormat, TextMode};
use crate::node::{DecoratorNode, DecoratorPayload, ElementNode, LineBreakNode, Node, RootNode, TextNode, UnknownNode};
use crate::selection::BaseSelection;
use crate::state::{EditorState, NodeMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stand-in payload for a `Decorator` node reconstructed from JSON: the
/// core has no way to rebuild a plugin's real payload type, so it keeps
/// the attachment text the serialized record carried and nothing else.
/// A plugin wanting lossless decorator round-tripping should serialize
/// its own payload through the `Unknown` escape hatch instead.
#[derive(Debug, Clone)]
struct OpaqueDecoratorPayload(String);

impl DecoratorPayload for OpaqueDecoratorPayload {
    fn attachment_text(&self) -> String {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum NodeRecord {
    Root {
        children: Vec<NodeRecord>,
    },
    Element {
        kind: ElementKind,
        format: ElementFormatType,
        indent: u32,
        direction: Option<Direction>,
        children: Vec<NodeRecord>,
    },
    Text {
        text: String,
        format: TextFormat,
        mode: TextMode,
        style: String,
        detail: TextDetail,
    },
    Linebreak,
    /// Lossy on purpose; see `OpaqueDecoratorPayload`.
    Decorator {
        attachment_text: String,
    },
    Unknown {
        type_tag: String,
        raw: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRecord {
    root: NodeRecord,
}

fn node_to_record(node_map: &NodeMap, key: NodeKey) -> NodeRecord {
    let node = match node_map.get(&key) {
        Some(n) => n.as_ref(),
        None => return NodeRecord::Unknown { type_tag: "missing".to_string(), raw: serde_json::Value::Null },
    };
    match node {
        Node::Root(r) => NodeRecord::Root { children: r.children.iter().map(|&c| node_to_record(node_map, c)).collect() },
        Node::Element(e) => {
            NodeRecord::Element { kind: e.kind.clone(), format: e.format, indent: e.indent, direction: e.direction, children: e.children.iter().map(|&c| node_to_record(node_map, c)).collect() }
        }
        Node::Text(t) => NodeRecord::Text { text: t.text.clone(), format: t.format, mode: t.mode, style: t.style.clone(), detail: t.detail },
        Node::LineBreak(_) => NodeRecord::Linebreak,
        Node::Decorator(d) => NodeRecord::Decorator { attachment_text: d.payload.attachment_text() },
        Node::Unknown(u) => NodeRecord::Unknown { type_tag: u.type_tag.clone(), raw: u.raw.clone() },
    }
}

fn record_to_node(record: &NodeRecord, parent: Option<NodeKey>, editor: &Editor, map: &mut NodeMap) -> NodeKey {
    let key = if parent.is_none() { ROOT_KEY } else { editor.allocate_key() };
    match record {
        NodeRecord::Root { children } => {
            let child_keys = children.iter().map(|c| record_to_node(c, Some(key), editor, map)).collect();
            map.insert(key, Arc::new(Node::Root(RootNode { key, version: 0, children: child_keys })));
        }
        NodeRecord::Element { kind, format, indent, direction, children } => {
            let child_keys = children.iter().map(|c| record_to_node(c, Some(key), editor, map)).collect();
            map.insert(
                key,
                Arc::new(Node::Element(ElementNode { key, parent_key: parent, version: 0, children: child_keys, kind: kind.clone(), format: *format, indent: *indent, direction: *direction })),
            );
        }
        NodeRecord::Text { text, format, mode, style, detail } => {
            map.insert(
                key,
                Arc::new(Node::Text(TextNode { key, parent_key: parent, version: 0, text: text.clone(), format: *format, mode: *mode, style: style.clone(), detail: *detail })),
            );
        }
        NodeRecord::Linebreak => {
            map.insert(key, Arc::new(Node::LineBreak(LineBreakNode { key, parent_key: parent, version: 0 })));
        }
        NodeRecord::Decorator { attachment_text } => {
            map.insert(key, Arc::new(Node::Decorator(DecoratorNode { key, parent_key: parent, version: 0, payload: Arc::new(OpaqueDecoratorPayload(attachment_text.clone())) })));
        }
        NodeRecord::Unknown { type_tag, raw } => {
            map.insert(key, Arc::new(Node::Unknown(UnknownNode { key, parent_key: parent, version: 0, type_tag: type_tag.clone(), raw: raw.clone() })));
        }
    }
    key
}

impl EditorState {
    /// Serializes the document tree to a tagged-record JSON string (spec
    /// §4.8). Selection is session-local and is not part of the
    /// serialized form.
    pub fn to_json(&self) -> EditorResult<String> {
        let record = DocumentRecord { root: node_to_record(&self.node_map, ROOT_KEY) };
        serde_json::to_string(&record).map_err(|e| EditorError::SerializationError { detail: e.to_string() })
    }

    /// Rebuilds an `EditorState` from a previously-serialized document,
    /// minting fresh keys through `editor` as it walks the tree. The
    /// round-trip law is `from_json(to_json(state))` equals `state`
    /// node-for-node, ignoring keys.
    pub fn from_json(json: &str, editor: &Editor) -> EditorResult<Self> {
        let record: DocumentRecord = serde_json::from_str(json).map_err(|e| EditorError::SerializationError { detail: e.to_string() })?;
        if !matches!(record.root, NodeRecord::Root { .. }) {
            return Err(EditorError::SerializationError { detail: "top-level record is not a root node".to_string() });
        }
        let mut map: NodeMap = NodeMap::default();
        record_to_node(&record.root, None, editor, &mut map);
        Ok(Self { node_map: Arc::new(map), selection: None })
    }
}
