//! `pointAtStringLocation` / `stringLocationForPoint` (spec §4.3).
//!
//! Grounded on `tree_nav.rs`'s prefix-walk `byte_to_line`/`line_to_byte`
//! pair, generalized from a recursive `Sums` descent to an explicit
//! Fenwick binary search plus a pre-order `RangeCache` lookup.

use super::{Affinity, Point, PointKind};
use crate::error::{EditorError, EditorResult};
use crate::fenwick::FenwickTree;
use crate::key::NodeKey;
use crate::range_cache::RangeCache;
use crate::state::EditorState;

/// Absolute UTF-16 location of `point` in flat text storage (spec §4.3).
pub fn string_location_for_point(state: &EditorState, cache: &RangeCache, fenwick: &FenwickTree, point: Point) -> EditorResult<u32> {
    let item = cache.get(point.key).ok_or(EditorError::KeyNotFound(point.key))?;
    let base = item.preamble_length;
    let start = fenwick.prefix_sum_exclusive(item.node_index) as u32;

    match point.kind {
        PointKind::Text => {
            let node = state.node(point.key).ok_or(EditorError::KeyNotFound(point.key))?;
            let text_len = node.as_text().map(|t| t.text.encode_utf16().count() as u32).unwrap_or(item.text_length);
            if point.offset > text_len {
                return Err(EditorError::PointOutOfRange { key: point.key, offset: point.offset });
            }
            Ok(start + base + point.offset)
        }
        PointKind::Element => {
            let node = state.node(point.key).ok_or(EditorError::KeyNotFound(point.key))?;
            let children = node.children();
            if point.offset as usize > children.len() {
                return Err(EditorError::PointOutOfRange { key: point.key, offset: point.offset });
            }
            let mut sum = 0u32;
            for &child_key in &children[..point.offset as usize] {
                let child_item = cache.get(child_key).ok_or(EditorError::ReconcilerInvariantViolation(format!("{child_key} missing from range cache")))?;
                sum += child_item.total_contribution();
            }
            Ok(start + base + sum)
        }
    }
}

/// Given an absolute location, finds the `(key, offset)` text point that
/// contains it, resolving preamble/postamble boundaries by `affinity`
/// (spec §4.3).
pub fn point_at_string_location(state: &EditorState, cache: &RangeCache, fenwick: &FenwickTree, loc: u32, affinity: Affinity) -> EditorResult<Point> {
    let target = loc as i64;
    if target > fenwick.total_sum() {
        return Err(EditorError::PointOutOfRange { key: crate::key::ROOT_KEY, offset: loc });
    }

    let idx = match fenwick.find_first_index_with_prefix(target + 1) {
        Some(i) => i,
        None => return end_of_document_point(state, cache, fenwick),
    };

    let start = fenwick.prefix_sum_exclusive(idx);

    // `loc` sits exactly at this slot's leading edge, i.e. on the
    // boundary between the previous node's postamble and this node's
    // preamble. Backward affinity means "the predecessor's end", not
    // "this node's start".
    let resolved_idx = if affinity == Affinity::Backward && target == start {
        nearest_live_index_at_or_before(cache, idx.saturating_sub(1)).unwrap_or(idx)
    } else {
        idx
    };

    let key = cache.key_for_index(resolved_idx).ok_or_else(|| EditorError::ReconcilerInvariantViolation(format!("no node registered at fenwick index {resolved_idx}")))?;

    text_point_near(state, cache, fenwick, key, affinity)
}

/// Walks pre-order from `key` to the nearest Text-node leaf, forward or
/// backward per `affinity`, and produces a point at that leaf's start
/// (forward) or end (backward). Non-text leaves (LineBreak, Decorator)
/// and empty Elements are normalized to the adjacent Text point, since
/// the character-level selection APIs (§4.6) operate on Text offsets.
fn text_point_near(state: &EditorState, cache: &RangeCache, fenwick: &FenwickTree, key: NodeKey, affinity: Affinity) -> EditorResult<Point> {
    let node = state.node(key).ok_or(EditorError::KeyNotFound(key))?;
    if let Some(text) = node.as_text() {
        let len = text.text.encode_utf16().count() as u32;
        let offset = match affinity {
            Affinity::Forward => 0,
            Affinity::Backward => len,
        };
        return Ok(Point::text(key, offset));
    }

    let item = cache.get(key).ok_or(EditorError::KeyNotFound(key))?;
    match affinity {
        Affinity::Forward => {
            if let Some(next_idx) = nearest_live_index_at_or_after(cache, item.node_index + 1, fenwick) {
                let next_key = cache.key_for_index(next_idx).expect("index just resolved live");
                text_point_near(state, cache, fenwick, next_key, affinity)
            } else {
                end_of_document_point(state, cache, fenwick)
            }
        }
        Affinity::Backward => {
            if item.node_index == 0 {
                return end_of_document_point(state, cache, fenwick);
            }
            if let Some(prev_idx) = nearest_live_index_at_or_before(cache, item.node_index - 1) {
                let prev_key = cache.key_for_index(prev_idx).expect("index just resolved live");
                text_point_near(state, cache, fenwick, prev_key, affinity)
            } else {
                end_of_document_point(state, cache, fenwick)
            }
        }
    }
}

fn nearest_live_index_at_or_before(cache: &RangeCache, mut idx: usize) -> Option<usize> {
    loop {
        if cache.key_for_index(idx).is_some() {
            return Some(idx);
        }
        if idx == 0 {
            return None;
        }
        idx -= 1;
    }
}

fn nearest_live_index_at_or_after(cache: &RangeCache, mut idx: usize, fenwick: &FenwickTree) -> Option<usize> {
    while idx < fenwick.capacity() {
        if cache.key_for_index(idx).is_some() {
            return Some(idx);
        }
        idx += 1;
    }
    None
}

/// The point at the very end of the document: the last live Text node's
/// end offset, or a collapsed element point at the root if the document
/// has no Text content at all.
fn end_of_document_point(state: &EditorState, cache: &RangeCache, fenwick: &FenwickTree) -> EditorResult<Point> {
    let mut idx = fenwick.capacity();
    loop {
        if idx == 0 {
            return Ok(Point::element(crate::key::ROOT_KEY, 0));
        }
        idx -= 1;
        if let Some(key) = cache.key_for_index(idx) {
            return text_point_near(state, cache, fenwick, key, Affinity::Backward);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyGenerator, ROOT_KEY};
    use crate::node::{Node, RootNode, ElementNode, TextNode};
    use crate::node::element::ElementKind;
    use crate::node::format::{ElementFormatType, TextFormat, TextDetail, TextMode};
    use crate::range_cache::RangeCacheItem;
    use std::sync::Arc;

    /// Builds the S4 fixture: two paragraphs "A" and "B", storage "A\nB".
    fn paragraph_boundary_fixture() -> (EditorState, RangeCache, FenwickTree, NodeKey, NodeKey, NodeKey, NodeKey) {
        let keys = KeyGenerator::new();
        let p1 = keys.next_key();
        let t1 = keys.next_key();
        let p2 = keys.next_key();
        let t2 = keys.next_key();

        let mut map = crate::state::NodeMap::default();
        map.insert(ROOT_KEY, Arc::new(Node::Root(RootNode { key: ROOT_KEY, version: 0, children: vec![p1, p2] })));
        map.insert(
            p1,
            Arc::new(Node::Element(ElementNode {
                key: p1,
                parent_key: Some(ROOT_KEY),
                version: 0,
                children: vec![t1],
                kind: ElementKind::Paragraph,
                format: ElementFormatType::Left,
                indent: 0,
                direction: None,
            })),
        );
        map.insert(
            t1,
            Arc::new(Node::Text(TextNode {
                key: t1,
                parent_key: Some(p1),
                version: 0,
                text: "A".to_string(),
                format: TextFormat::empty(),
                mode: TextMode::Normal,
                style: String::new(),
                detail: TextDetail::empty(),
            })),
        );
        map.insert(
            p2,
            Arc::new(Node::Element(ElementNode {
                key: p2,
                parent_key: Some(ROOT_KEY),
                version: 0,
                children: vec![t2],
                kind: ElementKind::Paragraph,
                format: ElementFormatType::Left,
                indent: 0,
                direction: None,
            })),
        );
        map.insert(
            t2,
            Arc::new(Node::Text(TextNode {
                key: t2,
                parent_key: Some(p2),
                version: 0,
                text: "B".to_string(),
                format: TextFormat::empty(),
                mode: TextMode::Normal,
                style: String::new(),
                detail: TextDetail::empty(),
            })),
        );

        let state = EditorState { node_map: Arc::new(map), selection: None };

        let mut cache = RangeCache::new();
        let mut fw = FenwickTree::new(4);

        // Pre-order: root, p1, t1, p2, t2. Root and paragraphs contribute
        // nothing of their own; t1 contributes "A" + trailing "\n"
        // postamble (the newline belongs to the earlier paragraph).
        let root_idx = cache.allocate_node_index();
        cache.set(ROOT_KEY, RangeCacheItem { node_index: root_idx, ..Default::default() });
        fw.update(root_idx, 0);

        let p1_idx = cache.allocate_node_index();
        cache.set(p1, RangeCacheItem { node_index: p1_idx, children_length: 2, ..Default::default() });
        fw.update(p1_idx, 0);

        let t1_idx = cache.allocate_node_index();
        cache.set(t1, RangeCacheItem { node_index: t1_idx, text_length: 1, postamble_length: 1, ..Default::default() });
        fw.update(t1_idx, 2);

        let p2_idx = cache.allocate_node_index();
        cache.set(p2, RangeCacheItem { node_index: p2_idx, children_length: 1, ..Default::default() });
        fw.update(p2_idx, 0);

        let t2_idx = cache.allocate_node_index();
        cache.set(t2, RangeCacheItem { node_index: t2_idx, text_length: 1, ..Default::default() });
        fw.update(t2_idx, 1);

        (state, cache, fw, p1, t1, p2, t2)
    }

    #[test]
    fn element_point_at_start_of_second_paragraph_maps_to_absolute_two() {
        let (state, cache, fw, _p1, _t1, p2, _t2) = paragraph_boundary_fixture();
        let point = Point::element(p2, 0);
        let loc = string_location_for_point(&state, &cache, &fw, point).unwrap();
        assert_eq!(loc, 2);
    }

    #[test]
    fn forward_affinity_at_boundary_lands_in_second_paragraph() {
        let (state, cache, fw, _p1, _t1, _p2, t2) = paragraph_boundary_fixture();
        let point = point_at_string_location(&state, &cache, &fw, 2, Affinity::Forward).unwrap();
        assert_eq!(point.key, t2);
        assert_eq!(point.offset, 0);
        assert_eq!(point.kind, PointKind::Text);
    }

    #[test]
    fn backward_affinity_at_boundary_lands_at_end_of_first_paragraph() {
        let (state, cache, fw, _p1, t1, _p2, _t2) = paragraph_boundary_fixture();
        let point = point_at_string_location(&state, &cache, &fw, 2, Affinity::Backward).unwrap();
        assert_eq!(point.key, t1);
        assert_eq!(point.offset, 1);
    }
}
