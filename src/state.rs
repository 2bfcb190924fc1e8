//! `EditorState`: the immutable `{ nodeMap, selection }` snapshot (spec
//! §3.1) and the garbage collector that sweeps keys unreachable from
//! root (spec §3.3).
//!
//! Grounded on `Tree { root, version }` (`tree.rs`) and `Doc`'s
//! `ArcSwap<Tree>` publication (`Doc::read`/`flush`), generalized from a
//! single rope root to a keyed node map plus selection.

use crate::key::{NodeKey, ROOT_KEY};
use crate::node::{Node, RootNode};
use crate::selection::BaseSelection;
use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::sync::Arc;

pub type NodeMap = FxHashMap<NodeKey, Arc<Node>>;

/// Immutable snapshot of the document tree and selection. A new
/// `EditorState` is produced per committed transaction; the previous one
/// remains valid for as long as anything holds it (readers never block
/// writers and vice versa).
#[derive(Debug, Clone)]
pub struct EditorState {
    pub(crate) node_map: Arc<NodeMap>,
    pub selection: Option<BaseSelection>,
}

impl EditorState {
    /// A state containing only the singleton root with no children.
    pub fn empty() -> Self {
        let mut map: NodeMap = FxHashMap::default();
        map.insert(ROOT_KEY, Arc::new(Node::Root(RootNode { key: ROOT_KEY, version: 0, children: Vec::new() })));
        Self { node_map: Arc::new(map), selection: None }
    }

    pub fn node(&self, key: NodeKey) -> Option<&Arc<Node>> {
        self.node_map.get(&key)
    }

    pub fn root(&self) -> &RootNode {
        match self.node_map.get(&ROOT_KEY).map(|n| n.as_ref()) {
            Some(Node::Root(root)) => root,
            _ => unreachable!("invariant 1: exactly one Root, always present under ROOT_KEY"),
        }
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty_tree(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Pre-order key traversal starting from root, restricted to the
    /// live, reachable document (spec §4.3 "indexing policy").
    pub fn preorder_keys(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.node_map.len());
        let mut stack = vec![ROOT_KEY];
        // Reverse-push children so traversal order is left-to-right.
        while let Some(key) = stack.pop() {
            out.push(key);
            if let Some(node) = self.node_map.get(&key) {
                for &child in node.children().iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Invariant 2: every non-root node's `parentKey` resolves to a
    /// present Element (or Root) in the same map, and appears in that
    /// parent's child list (invariant 3).
    pub fn check_parent_child_consistency(&self) -> Result<(), String> {
        for (key, node) in self.node_map.iter() {
            if *key == ROOT_KEY {
                continue;
            }
            let parent_key = node.parent_key().ok_or_else(|| format!("{key} has no parent"))?;
            let parent = self.node_map.get(&parent_key).ok_or_else(|| format!("{key}'s parent {parent_key} is missing"))?;
            if !parent.children().contains(key) {
                return Err(format!("{parent_key} does not list {key} as a child"));
            }
        }
        Ok(())
    }
}

/// Sweeps `nodeMap` (and, via the caller, the range cache and Fenwick
/// slots) of any key unreachable from root, per spec §3.3.
pub fn reachable_keys(state: &EditorState) -> HashSet<NodeKey> {
    state.preorder_keys().into_iter().collect()
}

pub fn garbage_collect(state: &mut EditorState) -> HashSet<NodeKey> {
    let live = reachable_keys(state);
    if live.len() != state.node_map.len() {
        let map = Arc::make_mut(&mut state.node_map);
        map.retain(|k, _| live.contains(k));
    }
    live
}
