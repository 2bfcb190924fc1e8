//! Legacy reconciler (spec §4.4): whole-tree rebuild.
//!
//! Grounded on `Tree::collect_text`'s in-order traversal (flattening the
//! rope's leaves into one string) and `Tree::apply_edits`'s
//! rebuild-then-replace shape.
//!
//! Scoping note: the spec describes this stage as operating "for each
//! dirty subtree rooted at R". This implementation treats the whole live
//! tree as that one subtree whenever anything is dirty, rather than
//! computing the minimal set of dirty roots — legacy mode exists to be
//! the simple, obviously-correct baseline the optimized pipeline is
//! checked against (including under `dark_launch`), so it trades the
//! tighter `O(|dirty subtree|)` bound for an implementation with no
//! partial-subtree bookkeeping to get wrong.

use crate::frontend::{AttributedString, Frontend, StorageRange, TrailingNewlinePolicy};
use crate::key::{NodeKey, ROOT_KEY};
use crate::metrics::Metrics;
use crate::node::{self, Node};
use crate::range_cache::{RangeCache, RangeCacheItem};
use crate::state::EditorState;
use crate::fenwick::FenwickTree;

/// Rebuilds `cache`/`fenwick` from scratch to match `pending`, and
/// replaces `[0, old_total_len)` of the frontend's storage with the
/// freshly built string. Returns the new total length alongside metrics.
pub fn reconcile(pending: &EditorState, cache: &mut RangeCache, fenwick: &mut FenwickTree, frontend: &mut dyn Frontend, old_total_len: u32) -> (u32, Metrics) {
    *cache = RangeCache::new();
    *fenwick = FenwickTree::new(pending.len());

    let policy = frontend.trailing_newline_policy();
    let mut storage = String::new();
    let mut nodes_processed = 0u32;
    visit(pending, ROOT_KEY, cache, fenwick, &mut storage, &mut nodes_processed, policy);

    let new_len = storage.encode_utf16().count() as u32;
    frontend.replace(StorageRange::new(0, old_total_len), &storage, &Default::default());

    let metrics = Metrics { delta_count: 1, fenwick_ops: nodes_processed, nodes_processed, ranges_added: nodes_processed, reconciler_kind: Some(super::ReconcilerKind::Legacy), ..Default::default() };
    (new_len, metrics)
}

fn visit(pending: &EditorState, key: NodeKey, cache: &mut RangeCache, fenwick: &mut FenwickTree, storage: &mut String, nodes_processed: &mut u32, policy: TrailingNewlinePolicy) -> u32 {
    let node = match pending.node(key) {
        Some(n) => n.as_ref(),
        None => return 0,
    };
    *nodes_processed += 1;

    let (preamble, text, mut postamble) = node.content_parts();
    if let Node::Element(e) = node {
        postamble = node::block_postamble(pending, key, &e.kind, policy);
    }
    storage.push_str(&preamble);
    storage.push_str(&text);

    let index = cache.allocate_node_index();
    let own = (preamble.encode_utf16().count() + text.encode_utf16().count() + postamble.encode_utf16().count()) as u32;

    let mut children_length = 0u32;
    for &child in node.children() {
        children_length += visit(pending, child, cache, fenwick, storage, nodes_processed, policy);
    }

    storage.push_str(&postamble);

    cache.set(
        key,
        RangeCacheItem {
            preamble_length: preamble.encode_utf16().count() as u32,
            children_length,
            text_length: text.encode_utf16().count() as u32,
            postamble_length: postamble.encode_utf16().count() as u32,
            node_index: index,
        },
    );
    fenwick.update(index, own as i64);

    own + children_length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::AttributeMap;
    use crate::node::{RootNode, TextNode};
    use crate::node::format::{TextDetail, TextFormat, TextMode};
    use crate::selection::BaseSelection;
    use std::sync::Arc;

    struct RecordingFrontend {
        replaced: Option<(StorageRange, String)>,
    }

    impl Frontend for RecordingFrontend {
        fn replace(&mut self, range: StorageRange, text: &str, _attrs: &AttributeMap) {
            self.replaced = Some((range, text.to_string()));
        }
        fn delete(&mut self, _range: StorageRange) {}
        fn insert(&mut self, _location: u32, _attributed: AttributedString) {}
        fn set_attributes(&mut self, _attrs: &AttributeMap, _range: StorageRange) {}
        fn update_native_selection(&mut self, _from: &BaseSelection) -> Result<(), crate::error::EditorError> {
            Ok(())
        }
        fn move_native_selection(&mut self, _mode: crate::selection::ModifyMode, _direction: crate::selection::MoveDirection, _granularity: crate::selection::Granularity) -> StorageRange {
            StorageRange::new(0, 0)
        }
        fn set_marked_text(&mut self, _attributed: AttributedString, _selected_range: StorageRange) {}
        fn unmark_text(&mut self) {}
        fn view_for_decorators(&self) -> crate::frontend::DecoratorHost {
            Arc::new(())
        }
        fn text_layout_width(&self) -> f32 {
            0.0
        }
        fn is_updating_native_selection(&self) -> bool {
            false
        }
        fn set_updating_native_selection(&mut self, _updating: bool) {}
    }

    #[test]
    fn rebuilds_storage_and_cache_for_single_text_node() {
        let mut map = crate::state::NodeMap::default();
        let t = NodeKey::from_raw(1);
        map.insert(ROOT_KEY, Arc::new(Node::Root(RootNode { key: ROOT_KEY, version: 0, children: vec![t] })));
        map.insert(t, Arc::new(Node::Text(TextNode { key: t, parent_key: Some(ROOT_KEY), version: 0, text: "Hello".into(), format: TextFormat::empty(), mode: TextMode::Normal, style: String::new(), detail: TextDetail::empty() })));
        let state = EditorState { node_map: Arc::new(map), selection: None };

        let mut cache = RangeCache::new();
        let mut fenwick = FenwickTree::new(0);
        let mut frontend = RecordingFrontend { replaced: None };

        let (len, metrics) = reconcile(&state, &mut cache, &mut fenwick, &mut frontend, 0);

        assert_eq!(len, 5);
        assert_eq!(frontend.replaced.unwrap().1, "Hello");
        assert_eq!(cache.get(t).unwrap().text_length, 5);
        assert_eq!(metrics.nodes_processed, 2);
    }
}
