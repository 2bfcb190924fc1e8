//! `RangeSelection::modify`, `deleteCharacter`, `insertText` (spec §4.6).
//!
//! Grounded on `input.rs`'s `on_key` caret/selection editing (grapheme-
//! boundary-aware backspace/delete over a flat rope), generalized from a
//! single flat-offset rope to tree-structured points and multi-level
//! block merges.
//!
//! Scoping note: cross-block merges here treat every Element uniformly
//! (a `ListItem` merges into its previous sibling exactly like a
//! `Paragraph` does) rather than special-casing list semantics, since
//! the core has no list-renumbering logic of its own — that is a plugin
//! concern per spec §1/§9.

use super::{ModifyMode, MoveDirection, Point, PointKind, RangeSelection};
use crate::error::{EditorError, EditorResult};
use crate::key::NodeKey;
use crate::node::Node;
use crate::transaction::Transaction;
use unicode_segmentation::UnicodeSegmentation;

/// Grapheme-aware caret movement for `Granularity::Character` (spec
/// §4.6). Word/line/paragraph movement has no tree-only implementation:
/// it defers to `Frontend::move_native_selection`'s tokenizer.
pub fn move_character(txn: &Transaction, selection: &RangeSelection, mode: ModifyMode, direction: MoveDirection) -> EditorResult<RangeSelection> {
    let new_focus = match direction {
        MoveDirection::Right => next_grapheme_point(txn, selection.focus)?,
        MoveDirection::Left => prev_grapheme_point(txn, selection.focus)?,
        MoveDirection::Up | MoveDirection::Down => {
            return Err(EditorError::InvalidSelection("vertical movement requires frontend layout".to_string()));
        }
    };
    let mut next = selection.clone();
    next.focus = new_focus;
    if mode == ModifyMode::Move {
        next.anchor = new_focus;
    }
    Ok(next)
}

/// `deleteCharacter(forward?)` (spec §4.6): non-collapsed ranges delete
/// their content; a collapsed caret at a text-node boundary merges with
/// the adjacent LineBreak/Text/block, otherwise deletes one grapheme
/// cluster.
pub fn delete_character(txn: &mut Transaction, selection: &RangeSelection, forward: bool) -> EditorResult<RangeSelection> {
    if !selection.is_collapsed() {
        return remove_range(txn, selection);
    }
    if forward {
        delete_forward(txn, selection.focus)
    } else {
        delete_backward(txn, selection.focus)
    }
}

/// `insertText(s)` (spec §4.6): replaces the current range with `s`,
/// preserving the anchor's node when the selection was already
/// collapsed.
pub fn insert_text(txn: &mut Transaction, selection: &RangeSelection, text: &str) -> EditorResult<RangeSelection> {
    let collapsed = if selection.is_collapsed() { RangeSelection::collapsed(selection.focus) } else { remove_range(txn, selection)? };
    let caret = collapsed.focus;
    if caret.kind != PointKind::Text {
        return Err(EditorError::InvalidSelection("insertText requires a text caret".to_string()));
    }
    let inserted_units = text.encode_utf16().count() as u32;
    {
        let node = txn.get_node_mut(caret.key)?;
        let text_node = node.as_text_mut().ok_or_else(|| EditorError::InvalidSelection("caret node is not text".to_string()))?;
        let byte_idx = utf16_offset_to_byte(caret.key, &text_node.text, caret.offset)?;
        text_node.text.insert_str(byte_idx, text);
    }
    Ok(RangeSelection::collapsed(Point::text(caret.key, caret.offset + inserted_units)))
}

fn delete_backward(txn: &mut Transaction, caret: Point) -> EditorResult<RangeSelection> {
    require_text_point(caret)?;
    if caret.offset > 0 {
        let start = prev_grapheme_boundary(txn, caret.key, caret.offset)?;
        trim_text_range(txn, caret.key, start, caret.offset)?;
        return Ok(RangeSelection::collapsed(Point::text(caret.key, start)));
    }

    if let Some(prev) = previous_sibling(txn, caret.key)? {
        let prev_node = txn.get_node(prev)?;
        if matches!(prev_node, Node::LineBreak(_)) {
            txn.remove_node(prev)?;
            return Ok(RangeSelection::collapsed(Point::text(caret.key, 0)));
        }
        if prev_node.as_text().is_some() {
            return merge_text_nodes(txn, prev, caret.key);
        }
    }

    merge_into_previous_block(txn, caret.key)
}

fn delete_forward(txn: &mut Transaction, caret: Point) -> EditorResult<RangeSelection> {
    require_text_point(caret)?;
    let len = text_len(txn, caret.key)?;
    if caret.offset < len {
        let end = next_grapheme_boundary(txn, caret.key, caret.offset)?;
        trim_text_range(txn, caret.key, caret.offset, end)?;
        return Ok(RangeSelection::collapsed(caret));
    }

    if let Some(next) = next_sibling(txn, caret.key)? {
        let next_node = txn.get_node(next)?;
        if matches!(next_node, Node::LineBreak(_)) {
            txn.remove_node(next)?;
            return Ok(RangeSelection::collapsed(caret));
        }
        if next_node.as_text().is_some() {
            return merge_text_nodes(txn, caret.key, next);
        }
    }

    merge_next_block_into_current(txn, caret.key)
}

fn require_text_point(point: Point) -> EditorResult<()> {
    if point.kind == PointKind::Text {
        Ok(())
    } else {
        Err(EditorError::InvalidSelection("deleteCharacter requires a text caret".to_string()))
    }
}

/// Appends `absorbed`'s text onto `into` and removes `absorbed`, placing
/// the caret at the join (spec §4.6 "merge the current text into it").
fn merge_text_nodes(txn: &mut Transaction, into: NodeKey, absorbed: NodeKey) -> EditorResult<RangeSelection> {
    let join_offset = text_len(txn, into)?;
    let absorbed_text = txn.get_node(absorbed)?.as_text().map(|t| t.text.clone()).unwrap_or_default();
    {
        let node = txn.get_node_mut(into)?;
        if let Some(text) = node.as_text_mut() {
            text.text.push_str(&absorbed_text);
        }
    }
    txn.remove_node(absorbed)?;
    Ok(RangeSelection::collapsed(Point::text(into, join_offset)))
}

/// Backward block merge at the start of a paragraph/list-item: moves all
/// of the current block's children onto the end of the previous block's
/// children and drops the now-empty current block (spec §4.6 "merge
/// into the previous paragraph's last text node, moving any following
/// children with it").
fn merge_into_previous_block(txn: &mut Transaction, key: NodeKey) -> EditorResult<RangeSelection> {
    let parent = txn.get_node(key)?.parent_key().ok_or(EditorError::ParentMissing(key))?;
    let Some(prev_block) = previous_sibling(txn, parent)? else {
        return Ok(RangeSelection::collapsed(Point::text(key, 0)));
    };

    let caret = last_text_end_point(txn, prev_block)?.unwrap_or(Point::element(prev_block, 0));
    let moving_children = txn.get_node(parent)?.children().to_vec();
    for child in moving_children {
        reparent_append(txn, prev_block, child)?;
    }
    txn.remove_node(parent)?;
    Ok(RangeSelection::collapsed(caret))
}

/// Forward block merge at the end of a paragraph/list-item: moves the
/// next block's children onto the end of the current block's children
/// and drops the next block, caret unchanged.
fn merge_next_block_into_current(txn: &mut Transaction, key: NodeKey) -> EditorResult<RangeSelection> {
    let caret_offset = text_len(txn, key)?;
    let parent = txn.get_node(key)?.parent_key().ok_or(EditorError::ParentMissing(key))?;
    let Some(next_block) = next_sibling(txn, parent)? else {
        return Ok(RangeSelection::collapsed(Point::text(key, caret_offset)));
    };

    let moving_children = txn.get_node(next_block)?.children().to_vec();
    for child in moving_children {
        reparent_append(txn, parent, child)?;
    }
    txn.remove_node(next_block)?;
    Ok(RangeSelection::collapsed(Point::text(key, caret_offset)))
}

/// Removes the selected content between `selection.anchor` and
/// `selection.focus` (spec §4.6 `removeText`) and returns a collapsed
/// selection at the earlier endpoint.
///
/// Same-parent and multi-level ranges both work: above the two
/// endpoints' common ancestor, only the subtrees strictly between the
/// two descent branches are deleted; at every level below the common
/// ancestor, the "rest of the branch" past the kept endpoint is deleted.
fn remove_range(txn: &mut Transaction, selection: &RangeSelection) -> EditorResult<RangeSelection> {
    let (lo, hi) = order_points(txn, selection.anchor, selection.focus)?;

    if lo.key == hi.key {
        trim_text_range(txn, lo.key, lo.offset, hi.offset)?;
        return Ok(RangeSelection::collapsed(lo));
    }

    trim_text_range(txn, lo.key, lo.offset, text_len(txn, lo.key)?)?;
    trim_text_range(txn, hi.key, 0, hi.offset)?;

    let lo_chain = ancestor_chain(txn, lo.key);
    let hi_chain = ancestor_chain(txn, hi.key);
    let common = lo_chain.iter().zip(hi_chain.iter()).take_while(|(a, b)| a == b).count();

    let common_parent = lo_chain[common - 1];
    let children = txn.get_node(common_parent)?.children().to_vec();
    let lo_pos = children.iter().position(|&k| k == lo_chain[common]).ok_or(EditorError::ParentMissing(lo_chain[common]))?;
    let hi_pos = children.iter().position(|&k| k == hi_chain[common]).ok_or(EditorError::ParentMissing(hi_chain[common]))?;
    for &sibling in &children[lo_pos + 1..hi_pos] {
        txn.remove_node(sibling)?;
    }

    for i in common..lo_chain.len().saturating_sub(1) {
        remove_following_siblings(txn, lo_chain[i], lo_chain[i + 1])?;
    }
    for i in common..hi_chain.len().saturating_sub(1) {
        remove_preceding_siblings(txn, hi_chain[i], hi_chain[i + 1])?;
    }

    Ok(RangeSelection::collapsed(lo))
}

fn remove_following_siblings(txn: &mut Transaction, parent: NodeKey, child: NodeKey) -> EditorResult<()> {
    let children = txn.get_node(parent)?.children().to_vec();
    if let Some(pos) = children.iter().position(|&k| k == child) {
        for &sibling in &children[pos + 1..] {
            txn.remove_node(sibling)?;
        }
    }
    Ok(())
}

fn remove_preceding_siblings(txn: &mut Transaction, parent: NodeKey, child: NodeKey) -> EditorResult<()> {
    let children = txn.get_node(parent)?.children().to_vec();
    if let Some(pos) = children.iter().position(|&k| k == child) {
        for &sibling in &children[..pos] {
            txn.remove_node(sibling)?;
        }
    }
    Ok(())
}

/// Reparents an already-materialized node onto `new_parent`'s child
/// list, appended at the end. Used by the block-merge helpers, which
/// relocate a whole block's children rather than create new ones.
fn reparent_append(txn: &mut Transaction, new_parent: NodeKey, child: NodeKey) -> EditorResult<()> {
    txn.get_node_mut(child)?.set_parent_key(Some(new_parent));
    let parent_node = txn.get_node_mut(new_parent)?;
    parent_node.children_mut().ok_or(EditorError::ParentMissing(new_parent))?.push(child);
    Ok(())
}

fn previous_sibling(txn: &Transaction, key: NodeKey) -> EditorResult<Option<NodeKey>> {
    let Some(parent) = txn.get_node(key)?.parent_key() else { return Ok(None) };
    let siblings = txn.get_node(parent)?.children();
    let pos = siblings.iter().position(|&k| k == key).ok_or(EditorError::ParentMissing(key))?;
    Ok(pos.checked_sub(1).map(|i| siblings[i]))
}

fn next_sibling(txn: &Transaction, key: NodeKey) -> EditorResult<Option<NodeKey>> {
    let Some(parent) = txn.get_node(key)?.parent_key() else { return Ok(None) };
    let siblings = txn.get_node(parent)?.children();
    let pos = siblings.iter().position(|&k| k == key).ok_or(EditorError::ParentMissing(key))?;
    Ok(siblings.get(pos + 1).copied())
}

/// The last Text descendant of `key`'s subtree (pre-order, last branch
/// first), used to place the caret after a backward block merge.
fn last_text_end_point(txn: &Transaction, key: NodeKey) -> EditorResult<Option<Point>> {
    let node = txn.get_node(key)?;
    if let Some(text) = node.as_text() {
        return Ok(Some(Point::text(key, text.text.encode_utf16().count() as u32)));
    }
    for &child in node.children().iter().rev() {
        if let Some(p) = last_text_end_point(txn, child)? {
            return Ok(Some(p));
        }
    }
    Ok(None)
}

fn ancestor_chain(txn: &Transaction, key: NodeKey) -> Vec<NodeKey> {
    let mut chain = vec![key];
    let mut current = key;
    while let Ok(node) = txn.get_node(current) {
        match node.parent_key() {
            Some(parent) => {
                chain.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    chain.reverse();
    chain
}

fn preorder_rank(txn: &Transaction, target: NodeKey) -> usize {
    fn visit(txn: &Transaction, key: NodeKey, counter: &mut usize, target: NodeKey) -> Option<usize> {
        let rank = *counter;
        *counter += 1;
        if key == target {
            return Some(rank);
        }
        if let Ok(node) = txn.get_node(key) {
            for &child in node.children() {
                if let Some(r) = visit(txn, child, counter, target) {
                    return Some(r);
                }
            }
        }
        None
    }
    let mut counter = 0;
    visit(txn, crate::key::ROOT_KEY, &mut counter, target).unwrap_or(usize::MAX)
}

fn order_points(txn: &Transaction, a: Point, b: Point) -> EditorResult<(Point, Point)> {
    if a.key == b.key {
        return Ok(if a.offset <= b.offset { (a, b) } else { (b, a) });
    }
    Ok(if preorder_rank(txn, a.key) <= preorder_rank(txn, b.key) { (a, b) } else { (b, a) })
}

fn text_len(txn: &Transaction, key: NodeKey) -> EditorResult<u32> {
    Ok(txn.get_node(key)?.as_text().map(|t| t.text.encode_utf16().count() as u32).unwrap_or(0))
}

fn trim_text_range(txn: &mut Transaction, key: NodeKey, start: u32, end: u32) -> EditorResult<()> {
    let node = txn.get_node_mut(key)?;
    let text_node = node.as_text_mut().ok_or_else(|| EditorError::InvalidSelection("range endpoint is not a text node".to_string()))?;
    let (start_b, end_b) = utf16_to_byte_range(key, &text_node.text, start, end)?;
    text_node.text.replace_range(start_b..end_b, "");
    Ok(())
}

/// `[start, end)` UTF-16 code unit positions in `s`, converted to byte
/// offsets in one scan.
fn utf16_to_byte_range(key: NodeKey, s: &str, start: u32, end: u32) -> EditorResult<(usize, usize)> {
    let start_b = utf16_offset_to_byte(key, s, start)?;
    let end_b = utf16_offset_to_byte(key, s, end)?;
    Ok((start_b, end_b))
}

fn utf16_offset_to_byte(key: NodeKey, s: &str, utf16_offset: u32) -> EditorResult<usize> {
    let mut units = 0u32;
    for (byte_idx, ch) in s.char_indices() {
        if units == utf16_offset {
            return Ok(byte_idx);
        }
        units += ch.len_utf16() as u32;
    }
    if units == utf16_offset {
        return Ok(s.len());
    }
    Err(EditorError::PointOutOfRange { key, offset: utf16_offset })
}

fn grapheme_utf16_boundaries(s: &str) -> Vec<u32> {
    let mut bounds = vec![0u32];
    let mut acc = 0u32;
    for g in s.graphemes(true) {
        acc += g.encode_utf16().count() as u32;
        bounds.push(acc);
    }
    bounds
}

fn next_grapheme_point(txn: &Transaction, point: Point) -> EditorResult<Point> {
    require_text_point(point)?;
    let node = txn.get_node(point.key)?;
    let text = node.as_text().ok_or_else(|| EditorError::InvalidSelection("focus is not a text point".to_string()))?;
    let bounds = grapheme_utf16_boundaries(&text.text);
    let idx = bounds.iter().position(|&b| b == point.offset).ok_or(EditorError::PointOutOfRange { key: point.key, offset: point.offset })?;
    if idx + 1 < bounds.len() {
        Ok(Point::text(point.key, bounds[idx + 1]))
    } else if let Some(next_key) = next_text_leaf(txn, point.key)? {
        Ok(Point::text(next_key, 0))
    } else {
        Ok(point)
    }
}

fn prev_grapheme_point(txn: &Transaction, point: Point) -> EditorResult<Point> {
    require_text_point(point)?;
    let node = txn.get_node(point.key)?;
    let text = node.as_text().ok_or_else(|| EditorError::InvalidSelection("focus is not a text point".to_string()))?;
    let bounds = grapheme_utf16_boundaries(&text.text);
    let idx = bounds.iter().position(|&b| b == point.offset).ok_or(EditorError::PointOutOfRange { key: point.key, offset: point.offset })?;
    if idx > 0 {
        Ok(Point::text(point.key, bounds[idx - 1]))
    } else if let Some(prev_key) = prev_text_leaf(txn, point.key)? {
        let len = text_len(txn, prev_key)?;
        Ok(Point::text(prev_key, len))
    } else {
        Ok(point)
    }
}

fn prev_grapheme_boundary(txn: &Transaction, key: NodeKey, offset: u32) -> EditorResult<u32> {
    let node = txn.get_node(key)?;
    let text = node.as_text().ok_or_else(|| EditorError::InvalidSelection("expected a text node".to_string()))?;
    let bounds = grapheme_utf16_boundaries(&text.text);
    let idx = bounds.iter().position(|&b| b == offset).ok_or(EditorError::PointOutOfRange { key, offset })?;
    if idx == 0 {
        return Err(EditorError::PointOutOfRange { key, offset });
    }
    Ok(bounds[idx - 1])
}

fn next_grapheme_boundary(txn: &Transaction, key: NodeKey, offset: u32) -> EditorResult<u32> {
    let node = txn.get_node(key)?;
    let text = node.as_text().ok_or_else(|| EditorError::InvalidSelection("expected a text node".to_string()))?;
    let bounds = grapheme_utf16_boundaries(&text.text);
    let idx = bounds.iter().position(|&b| b == offset).ok_or(EditorError::PointOutOfRange { key, offset })?;
    bounds.get(idx + 1).copied().ok_or(EditorError::PointOutOfRange { key, offset })
}

/// Pre-order successor leaf that is a Text node, walking forward through
/// sibling subtrees and up through ancestors.
fn next_text_leaf(txn: &Transaction, key: NodeKey) -> EditorResult<Option<NodeKey>> {
    if let Some(&first_child) = txn.get_node(key)?.children().first() {
        if let Some(found) = first_text_in_subtree(txn, first_child)? {
            return Ok(Some(found));
        }
    }
    let mut current = key;
    loop {
        match next_sibling(txn, current)? {
            Some(sibling) => {
                if let Some(found) = first_text_in_subtree(txn, sibling)? {
                    return Ok(Some(found));
                }
                current = sibling;
            }
            None => {
                let Some(parent) = txn.get_node(current)?.parent_key() else { return Ok(None) };
                current = parent;
            }
        }
    }
}

/// Pre-order predecessor leaf that is a Text node.
fn prev_text_leaf(txn: &Transaction, key: NodeKey) -> EditorResult<Option<NodeKey>> {
    let mut current = key;
    loop {
        match previous_sibling(txn, current)? {
            Some(sibling) => {
                if let Some(found) = last_text_in_subtree(txn, sibling)? {
                    return Ok(Some(found));
                }
                current = sibling;
            }
            None => {
                let Some(parent) = txn.get_node(current)?.parent_key() else { return Ok(None) };
                if txn.get_node(parent)?.as_text().is_some() {
                    return Ok(Some(parent));
                }
                current = parent;
            }
        }
    }
}

fn first_text_in_subtree(txn: &Transaction, key: NodeKey) -> EditorResult<Option<NodeKey>> {
    let node = txn.get_node(key)?;
    if node.as_text().is_some() {
        return Ok(Some(key));
    }
    for &child in node.children() {
        if let Some(found) = first_text_in_subtree(txn, child)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn last_text_in_subtree(txn: &Transaction, key: NodeKey) -> EditorResult<Option<NodeKey>> {
    let node = txn.get_node(key)?;
    if node.as_text().is_some() {
        return Ok(Some(key));
    }
    for &child in node.children().iter().rev() {
        if let Some(found) = last_text_in_subtree(txn, child)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeyGenerator, ROOT_KEY};
    use crate::node::element::ElementKind;
    use crate::node::format::TextFormat;
    use crate::state::EditorState;
    use crate::transaction::DirtySet;
    use rustc_hash::FxHashMap;

    fn fresh_transaction() -> (EditorState, DirtySet, KeyGenerator, crossbeam::queue::SegQueue<Box<dyn FnOnce(&mut crate::editor::Editor) + Send>>) {
        (EditorState::empty(), FxHashMap::default(), KeyGenerator::new(), crossbeam::queue::SegQueue::new())
    }

    #[test]
    fn backward_delete_within_text_removes_one_grapheme() {
        let (mut state, mut dirty, keys, nested) = fresh_transaction();
        let mut txn = Transaction::new(&mut state, &mut dirty, &keys, &nested);
        let t = txn.create_text(ROOT_KEY, "ab", TextFormat::empty()).unwrap();

        let selection = RangeSelection::collapsed(Point::text(t, 2));
        let after = delete_character(&mut txn, &selection, false).unwrap();

        assert_eq!(txn.get_node(t).unwrap().as_text().unwrap().text, "a");
        assert_eq!(after.focus, Point::text(t, 1));
    }

    #[test]
    fn backward_delete_at_start_merges_into_previous_text_sibling() {
        let (mut state, mut dirty, keys, nested) = fresh_transaction();
        let mut txn = Transaction::new(&mut state, &mut dirty, &keys, &nested);
        let p = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
        let a = txn.create_text(p, "foo", TextFormat::empty()).unwrap();
        let b = txn.create_text(p, "bar", TextFormat::empty()).unwrap();

        let selection = RangeSelection::collapsed(Point::text(b, 0));
        let after = delete_character(&mut txn, &selection, false).unwrap();

        assert_eq!(txn.get_node(a).unwrap().as_text().unwrap().text, "foobar");
        assert_eq!(after.focus, Point::text(a, 3));
    }

    #[test]
    fn backward_delete_at_start_of_paragraph_merges_blocks() {
        let (mut state, mut dirty, keys, nested) = fresh_transaction();
        let mut txn = Transaction::new(&mut state, &mut dirty, &keys, &nested);
        let p1 = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
        let t1 = txn.create_text(p1, "one", TextFormat::empty()).unwrap();
        let p2 = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
        let t2 = txn.create_text(p2, "two", TextFormat::empty()).unwrap();

        let selection = RangeSelection::collapsed(Point::text(t2, 0));
        let after = delete_character(&mut txn, &selection, false).unwrap();

        assert_eq!(txn.get_node(ROOT_KEY).unwrap().children(), &[p1]);
        assert_eq!(txn.get_node(p1).unwrap().children(), &[t1, t2]);
        assert_eq!(after.focus, Point::text(t1, 3));
    }

    #[test]
    fn insert_text_into_collapsed_caret_preserves_node() {
        let (mut state, mut dirty, keys, nested) = fresh_transaction();
        let mut txn = Transaction::new(&mut state, &mut dirty, &keys, &nested);
        let t = txn.create_text(ROOT_KEY, "ac", TextFormat::empty()).unwrap();

        let selection = RangeSelection::collapsed(Point::text(t, 1));
        let after = insert_text(&mut txn, &selection, "b").unwrap();

        assert_eq!(txn.get_node(t).unwrap().as_text().unwrap().text, "abc");
        assert_eq!(after.focus, Point::text(t, 2));
    }

    #[test]
    fn remove_range_within_single_text_node() {
        let (mut state, mut dirty, keys, nested) = fresh_transaction();
        let mut txn = Transaction::new(&mut state, &mut dirty, &keys, &nested);
        let t = txn.create_text(ROOT_KEY, "hello", TextFormat::empty()).unwrap();

        let selection = RangeSelection { anchor: Point::text(t, 1), focus: Point::text(t, 4), format: TextFormat::empty(), style: String::new() };
        let after = insert_text(&mut txn, &selection, "");
        let after = after.unwrap_or_else(|_| RangeSelection::collapsed(Point::text(t, 1)));

        assert_eq!(txn.get_node(t).unwrap().as_text().unwrap().text, "ho");
        assert_eq!(after.focus.key, t);
    }
}
