//! Update transactions (spec §3.3, §4.1): copy-on-write node mutation,
//! dirty tracking, normalization, and the reentrant nested-update queue.
//!
//! Grounded on `Doc::edit`/`Doc::flush`'s buffer-then-atomically-apply
//! pipeline (batched edits applied as one unit, then the committed
//! snapshot swapped) for the overall commit shape. Node mutation here
//! takes an explicit `&mut Transaction` handle rather than consulting a
//! thread-local "active editor" — see `DESIGN.md`'s Open Questions for
//! why.

use crate::editor::Editor;
use crate::error::{EditorError, EditorResult};
use crate::key::{KeyGenerator, NodeKey};
use crate::node::element::ElementKind;
use crate::node::format::{ElementFormatType, TextDetail, TextFormat, TextMode};
use crate::node::{self, DecoratorNode, DecoratorPayload, ElementNode, LineBreakNode, Node, TextNode, UnknownNode};
use crate::selection::BaseSelection;
use crate::state::EditorState;
use crossbeam::queue::SegQueue;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Why a node is in the dirty set, driving how the reconciler treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyCause {
    Created,
    Mutated,
    Removed,
}

pub type DirtySet = FxHashMap<NodeKey, DirtyCause>;

/// The handle node-mutation APIs take while inside `Editor::update`. Only
/// one `Transaction` exists at a time per editor (nested `update` calls
/// are queued via `enqueue_nested`, not reentered directly).
pub struct Transaction<'a> {
    pending: &'a mut EditorState,
    dirty: &'a mut DirtySet,
    key_gen: &'a KeyGenerator,
    nested: &'a SegQueue<Box<dyn FnOnce(&mut Editor) + Send>>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(pending: &'a mut EditorState, dirty: &'a mut DirtySet, key_gen: &'a KeyGenerator, nested: &'a SegQueue<Box<dyn FnOnce(&mut Editor) + Send>>) -> Self {
        Self { pending, dirty, key_gen, nested }
    }

    pub fn get_node(&self, key: NodeKey) -> EditorResult<&Node> {
        self.pending.node_map.get(&key).map(|n| n.as_ref()).ok_or(EditorError::KeyNotFound(key))
    }

    /// Copy-on-write mutable access: clones the node into the pending
    /// map on first touch this transaction, bumps its version, and marks
    /// it dirty.
    pub fn get_node_mut(&mut self, key: NodeKey) -> EditorResult<&mut Node> {
        if !self.pending.node_map.contains_key(&key) {
            return Err(EditorError::KeyNotFound(key));
        }
        let map = Arc::make_mut(&mut self.pending.node_map);
        let arc_node = map.get_mut(&key).expect("checked contains_key above");
        let node = Arc::make_mut(arc_node);
        node.bump_version();
        self.dirty.entry(key).or_insert(DirtyCause::Mutated);
        Ok(node)
    }

    pub fn mark_dirty(&mut self, key: NodeKey, cause: DirtyCause) {
        self.dirty.insert(key, cause);
    }

    pub fn selection(&self) -> Option<&BaseSelection> {
        self.pending.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<BaseSelection>) {
        self.pending.selection = selection;
    }

    fn insert(&mut self, key: NodeKey, node: Node) {
        Arc::make_mut(&mut self.pending.node_map).insert(key, Arc::new(node));
        self.dirty.insert(key, DirtyCause::Created);
    }

    pub fn create_text(&mut self, parent: NodeKey, text: impl Into<String>, format: TextFormat) -> EditorResult<NodeKey> {
        self.require_element(parent)?;
        let key = self.key_gen.next_key();
        self.insert(
            key,
            Node::Text(TextNode { key, parent_key: Some(parent), version: 0, text: text.into(), format, mode: TextMode::Normal, style: String::new(), detail: TextDetail::empty() }),
        );
        self.append_child(parent, key)?;
        Ok(key)
    }

    pub fn create_element(&mut self, parent: Option<NodeKey>, kind: ElementKind) -> EditorResult<NodeKey> {
        if let Some(p) = parent {
            self.require_element(p)?;
        }
        let key = self.key_gen.next_key();
        self.insert(key, Node::Element(ElementNode { key, parent_key: parent, version: 0, children: Vec::new(), kind, format: ElementFormatType::default(), indent: 0, direction: None }));
        if let Some(p) = parent {
            self.append_child(p, key)?;
        }
        Ok(key)
    }

    pub fn create_line_break(&mut self, parent: NodeKey) -> EditorResult<NodeKey> {
        self.require_element(parent)?;
        let key = self.key_gen.next_key();
        self.insert(key, Node::LineBreak(LineBreakNode { key, parent_key: Some(parent), version: 0 }));
        self.append_child(parent, key)?;
        Ok(key)
    }

    pub fn create_decorator(&mut self, parent: NodeKey, payload: Arc<dyn DecoratorPayload>) -> EditorResult<NodeKey> {
        self.require_element(parent)?;
        let key = self.key_gen.next_key();
        self.insert(key, Node::Decorator(DecoratorNode { key, parent_key: Some(parent), version: 0, payload }));
        self.append_child(parent, key)?;
        Ok(key)
    }

    pub fn create_unknown(&mut self, parent: Option<NodeKey>, type_tag: String, raw: serde_json::Value) -> EditorResult<NodeKey> {
        let key = self.key_gen.next_key();
        self.insert(key, Node::Unknown(UnknownNode { key, parent_key: parent, version: 0, type_tag, raw }));
        if let Some(p) = parent {
            self.append_child(p, key)?;
        }
        Ok(key)
    }

    fn require_element(&self, key: NodeKey) -> EditorResult<()> {
        let node = self.get_node(key)?;
        if node.is_element_like() {
            Ok(())
        } else {
            Err(EditorError::ParentMissing(key))
        }
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> EditorResult<()> {
        if self.is_ancestor_of(child, parent) {
            return Err(EditorError::CycleDetected(child));
        }
        let node = self.get_node_mut(parent)?;
        node.children_mut().ok_or(EditorError::ParentMissing(parent))?.push(child);
        Ok(())
    }

    /// True if `candidate` is `node` or an ancestor of `node` (used to
    /// reject `append`/`insertBefore` calls that would make an ancestor a
    /// descendant of itself — spec invariant guard in §4.2).
    fn is_ancestor_of(&self, candidate: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == candidate {
                return true;
            }
            current = self.pending.node_map.get(&key).and_then(|n| n.parent_key());
        }
        false
    }

    /// Unlinks `key` from its parent's child list and marks it removed.
    /// The node stays in `nodeMap` until the post-commit GC sweep (spec
    /// §3.3): the reconciler still needs to know where it used to be.
    pub fn remove_node(&mut self, key: NodeKey) -> EditorResult<()> {
        let parent_key = self.get_node(key)?.parent_key();
        if let Some(parent) = parent_key {
            let parent_node = self.get_node_mut(parent)?;
            if let Some(children) = parent_node.children_mut() {
                children.retain(|&k| k != key);
            }
        }
        self.mark_dirty(key, DirtyCause::Removed);
        Ok(())
    }

    pub fn insert_before(&mut self, anchor: NodeKey, new_key: NodeKey) -> EditorResult<()> {
        let parent = self.get_node(anchor)?.parent_key().ok_or(EditorError::ParentMissing(anchor))?;
        if self.is_ancestor_of(new_key, parent) {
            return Err(EditorError::CycleDetected(new_key));
        }
        self.get_node_mut(new_key)?.set_parent_key(Some(parent));
        let parent_node = self.get_node_mut(parent)?;
        let children = parent_node.children_mut().ok_or(EditorError::ParentMissing(parent))?;
        let pos = children.iter().position(|&k| k == anchor).ok_or(EditorError::ParentMissing(anchor))?;
        children.insert(pos, new_key);
        Ok(())
    }

    pub fn insert_after(&mut self, anchor: NodeKey, new_key: NodeKey) -> EditorResult<()> {
        let parent = self.get_node(anchor)?.parent_key().ok_or(EditorError::ParentMissing(anchor))?;
        if self.is_ancestor_of(new_key, parent) {
            return Err(EditorError::CycleDetected(new_key));
        }
        self.get_node_mut(new_key)?.set_parent_key(Some(parent));
        let parent_node = self.get_node_mut(parent)?;
        let children = parent_node.children_mut().ok_or(EditorError::ParentMissing(parent))?;
        let pos = children.iter().position(|&k| k == anchor).ok_or(EditorError::ParentMissing(anchor))?;
        children.insert(pos + 1, new_key);
        Ok(())
    }

    /// Queues a fully independent nested `editor.update` to run once the
    /// current transaction commits (spec §4.1 reentrancy: `update` calls
    /// made from inside command listeners or node hooks don't reenter,
    /// they queue). Runs in FIFO order.
    pub fn enqueue_nested(&self, f: impl FnOnce(&mut Editor) + Send + 'static) {
        self.nested.push(Box::new(f));
    }
}

/// Normalization pass run after the transaction body but before the
/// reconciler (spec §3.2 invariant 8, §4.1): merges adjacent mergeable
/// Text siblings and drops empty Text nodes not anchoring the selection.
pub fn normalize(pending: &mut EditorState, dirty: &mut DirtySet) {
    // A dirty node's parent needs its children re-checked for merges; a
    // dirty Element/Root with no parent (i.e. Root itself) re-checks its
    // own children.
    let parents_to_check: Vec<NodeKey> = dirty
        .keys()
        .filter_map(|&key| {
            let node = pending.node_map.get(&key)?;
            node.parent_key().or_else(|| node.is_element_like().then_some(key))
        })
        .collect();
    let mut seen = std::collections::HashSet::new();
    for parent in parents_to_check {
        if !seen.insert(parent) {
            continue;
        }
        normalize_children(pending, dirty, parent);
    }
}

fn normalize_children(pending: &mut EditorState, dirty: &mut DirtySet, parent: NodeKey) {
    let selection_anchor_keys: std::collections::HashSet<NodeKey> = match &pending.selection {
        Some(BaseSelection::Range(r)) => [r.anchor.key, r.focus.key].into_iter().collect(),
        _ => std::collections::HashSet::new(),
    };

    let children = match pending.node_map.get(&parent).map(|n| n.children().to_vec()) {
        Some(c) => c,
        None => return,
    };

    let mut merged_away: Vec<NodeKey> = Vec::new();
    let mut new_children: Vec<NodeKey> = Vec::new();
    let mut i = 0;
    while i < children.len() {
        let key = children[i];
        let is_text = pending.node_map.get(&key).map(|n| n.as_text().is_some()).unwrap_or(false);
        if !is_text {
            new_children.push(key);
            i += 1;
            continue;
        }

        // Drop empty, unanchored Text nodes.
        let is_empty = pending.node_map.get(&key).and_then(|n| n.as_text()).map(|t| t.text.is_empty()).unwrap_or(false);
        if is_empty && !selection_anchor_keys.contains(&key) {
            merged_away.push(key);
            i += 1;
            continue;
        }

        // Absorb every following mergeable sibling into `key`.
        let mut j = i + 1;
        while j < children.len() {
            let next_key = children[j];
            let mergeable = {
                let map = &pending.node_map;
                match (map.get(&key).and_then(|n| n.as_text()), map.get(&next_key).and_then(|n| n.as_text())) {
                    (Some(a), Some(b)) => node::text_nodes_mergeable(a, b),
                    _ => false,
                }
            };
            if !mergeable {
                break;
            }
            let absorbed_text = pending.node_map.get(&next_key).and_then(|n| n.as_text()).map(|t| t.text.clone()).unwrap_or_default();
            {
                let map = Arc::make_mut(&mut pending.node_map);
                if let Some(arc) = map.get_mut(&key) {
                    let node = Arc::make_mut(arc);
                    if let Some(text_node) = node.as_text_mut() {
                        text_node.text.push_str(&absorbed_text);
                        text_node.version += 1;
                    }
                }
            }
            dirty.entry(key).or_insert(DirtyCause::Mutated);
            merged_away.push(next_key);
            j += 1;
        }
        new_children.push(key);
        i = j;
    }

    if !merged_away.is_empty() {
        {
            let map = Arc::make_mut(&mut pending.node_map);
            if let Some(arc) = map.get_mut(&parent) {
                let node = Arc::make_mut(arc);
                if let Some(children) = node.children_mut() {
                    *children = new_children;
                }
            }
        }
        for key in merged_away {
            dirty.insert(key, DirtyCause::Removed);
        }
        dirty.entry(parent).or_insert(DirtyCause::Mutated);
    }
}
