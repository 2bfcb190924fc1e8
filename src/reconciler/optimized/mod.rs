//! The optimized reconciler pipeline (spec §4.5): keyed diff → delta
//! batch → stable-order applier → Fenwick/cache patch.

pub mod applier;
pub mod cache;
pub mod delta;
pub mod diff;

use crate::frontend::{Frontend, TrailingNewlinePolicy};
use crate::key::NodeKey;
use crate::range_cache::RangeCache;
use crate::state::EditorState;
use crate::transaction::DirtySet;
use applier::DeltaApplicationResult;
use delta::{DeltaBatch, DeltaBatchMeta, ReconcilerDelta};
use diff::{diff_children, ChildEdit};
use crate::fenwick::FenwickTree;

/// Stage 1 + 2: walks the dirty set and produces an ordered `DeltaBatch`.
///
/// `cache`/`fenwick` here are the *pre-batch* structures (spec §4.5 Stage
/// 2: deletion ranges are resolved from pre-batch Fenwick prefix sums);
/// `cache` is taken `&mut` solely to pre-allocate `nodeIndex`es for newly
/// inserted nodes (see `ReconcilerDelta::NodeInsertion`'s doc comment),
/// not to record their cache entries yet — that's Stage 4's job.
pub fn build_batch(committed: &EditorState, pending: &EditorState, dirty: &DirtySet, cache: &mut RangeCache, fenwick: &FenwickTree, policy: TrailingNewlinePolicy) -> DeltaBatch {
    let mut deltas = Vec::new();

    let dirty_keys: Vec<NodeKey> = dirty.keys().copied().collect();

    for key in dirty_keys {
        let Some(node) = pending.node(key) else {
            // Removed this transaction: emit a deletion if it was
            // previously materialized.
            if let Some(item) = cache.get(key) {
                let start = fenwick.prefix_sum_exclusive(item.node_index) as u32;
                deltas.push(ReconcilerDelta::NodeDeletion { node_key: key, range_in_storage: crate::frontend::StorageRange::new(start, start + item.own_contribution()) });
            }
            continue;
        };

        if let Some(text) = node.as_text() {
            if let Some(item) = cache.get(key) {
                let new_len = text.text.encode_utf16().count() as u32;
                if new_len != item.text_length {
                    let start = fenwick.prefix_sum_exclusive(item.node_index) as u32 + item.preamble_length;
                    deltas.push(ReconcilerDelta::TextUpdate { node_key: key, new_text: text.text.clone(), range_in_storage: crate::frontend::StorageRange::new(start, start + item.text_length) });
                }
            }
            continue;
        }

        if !node.is_element_like() {
            continue;
        }

        let old_children = committed.node(key).map(|n| n.children().to_vec()).unwrap_or_default();
        let new_children = node.children().to_vec();
        if old_children == new_children {
            // No structural change: an indent/format/direction change on
            // an Element surfaces as an attribute change, not a preamble
            // rewrite (resolved Open Question, see `SPEC_FULL.md` §3).
            if let (Some(element), Some(item)) = (node.as_element(), cache.get(key)) {
                let start = fenwick.prefix_sum_exclusive(item.node_index) as u32;
                let end = start + item.own_contribution();
                deltas.push(ReconcilerDelta::AttributeChange { node_key: key, attributes: element_attributes(element), range_in_storage: crate::frontend::StorageRange::new(start, end) });
            }
            continue;
        }

        let edits = diff_children(&old_children, &new_children);
        let mut running_offset = cache.get(key).map(|item| fenwick.prefix_sum_exclusive(item.node_index) as u32 + item.preamble_length + item.children_length).unwrap_or(0);

        for edit in edits {
            match edit {
                ChildEdit::Kept(_) => {}
                ChildEdit::Deleted(child) => {
                    if let Some(item) = cache.get(child) {
                        let start = fenwick.prefix_sum_exclusive(item.node_index) as u32;
                        deltas.push(ReconcilerDelta::NodeDeletion { node_key: child, range_in_storage: crate::frontend::StorageRange::new(start, start + item.own_contribution()) });
                    }
                }
                ChildEdit::Inserted(child) => {
                    emit_subtree_insertions(pending, child, &mut running_offset, cache, &mut deltas, policy);
                }
            }
        }
    }

    let mut batch = DeltaBatch { deltas, meta: DeltaBatchMeta { expected_text_storage_length: fenwick.total_sum().max(0) as u32, requires_anchor_validation: true, fallback_threshold: u32::MAX } };
    batch.stable_sort();
    batch
}

/// Flattens an `ElementNode`'s indent/direction into the opaque
/// attribute bag `Frontend::set_attributes` expects.
fn element_attributes(element: &crate::node::ElementNode) -> crate::frontend::AttributeMap {
    let mut attrs = crate::frontend::AttributeMap::new();
    attrs.insert("indent".to_string(), element.indent.to_string());
    if let Some(direction) = element.direction {
        attrs.insert("direction".to_string(), format!("{direction:?}"));
    }
    attrs
}

/// Pre-order walk emitting one `NodeInsertion` delta per materialized
/// node in the newly inserted subtree rooted at `key`, advancing
/// `offset` past each node's own contribution as it goes (spec §4.5
/// Stage 2: "insertions use locations resolved from the in-progress
/// running total").
fn emit_subtree_insertions(pending: &EditorState, key: NodeKey, offset: &mut u32, cache: &mut RangeCache, deltas: &mut Vec<ReconcilerDelta>, policy: TrailingNewlinePolicy) {
    let Some(node) = pending.node(key) else { return };
    let (preamble, text, mut postamble) = node.content_parts();
    if let crate::node::Node::Element(e) = node.as_ref() {
        postamble = crate::node::block_postamble(pending, key, &e.kind, policy);
    }
    let node_index = cache.allocate_node_index();

    // Elements: preamble is always empty in this model (see
    // `Node::content_parts`), so their own delta's location doesn't need
    // to wait on children; postamble does, so children are emitted first
    // and this node's delta carries only its (possibly empty) preamble
    // plus deferred postamble, inserted once children have advanced the
    // offset.
    let own_location = *offset;
    *offset += (preamble.encode_utf16().count() + text.encode_utf16().count()) as u32;

    for &child in node.children() {
        emit_subtree_insertions(pending, child, offset, cache, deltas, policy);
    }

    let postamble_len = postamble.encode_utf16().count() as u32;
    deltas.push(ReconcilerDelta::NodeInsertion { node_key: key, preamble, content: text, postamble, location: own_location, node_index });
    *offset += postamble_len;
}

/// Runs the full Stage 3 + Stage 4 pipeline against an already-built
/// batch.
pub fn apply_batch(batch: &DeltaBatch, cache: &mut RangeCache, fenwick: &mut FenwickTree, frontend: &mut dyn Frontend) -> DeltaApplicationResult {
    let result = applier::apply_batch(batch, frontend);
    let applied_count = match &result {
        DeltaApplicationResult::Success { applied, .. } => *applied as usize,
        DeltaApplicationResult::PartialSuccess { applied, .. } => *applied as usize,
        DeltaApplicationResult::Failure { .. } => 0,
    };
    for delta in batch.deltas.iter().take(applied_count) {
        cache::apply_cache_update(delta, cache, fenwick);
    }
    result
}
