//! Integration tests for the six concrete scenarios (spec §8): each one
//! drives a real `Editor` through `update` and asserts on the resulting
//! storage string, tree shape, and offset-index queries, rather than
//! hand-assembling fixtures the way the unit tests in `selection/
//! mapping.rs` do.

mod common;

use common::RecordingFrontend;
use scribe_core::editor::{Editor, EditorConfig};
use scribe_core::fenwick::FenwickTree;
use scribe_core::key::ROOT_KEY;
use scribe_core::node::element::ElementKind;
use scribe_core::node::format::TextFormat;
use scribe_core::range_cache::{RangeCache, RangeCacheItem};
use scribe_core::reconciler::ReconcilerMode;
use scribe_core::selection::{delete_character, insert_text, Affinity, BaseSelection, Point, RangeSelection};
use scribe_core::selection::{point_at_string_location, string_location_for_point};

fn editor_with_mode(mode: ReconcilerMode) -> Editor {
    Editor::new(Box::new(RecordingFrontend::default()), EditorConfig { reconciler_mode: mode, ..Default::default() })
}

/// Like `editor_with_mode`, but also hands back a `RecordingFrontend`
/// handle sharing the same backing buffer, for scenarios that need to
/// assert on the real post-commit storage string rather than a
/// hand-walked reconstruction of the tree.
fn editor_with_recording_frontend(mode: ReconcilerMode) -> (Editor, RecordingFrontend) {
    let frontend = RecordingFrontend::default();
    let handle = frontend.clone();
    let editor = Editor::new(Box::new(frontend), EditorConfig { reconciler_mode: mode, ..Default::default() });
    (editor, handle)
}

/// S1 — Basic text input. From an empty editor, dispatching
/// `INSERT_TEXT("Hello")` yields storage `"Hello"`; the first text
/// node's `textLength == 5`; `pointAtStringLocation(5, backward).offset
/// == 5`.
#[test]
fn s1_basic_text_input() {
    let mut editor = editor_with_mode(ReconcilerMode::Legacy);
    editor
        .update(|txn| {
            let p = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
            let caret = RangeSelection::collapsed(Point::element(p, 0));
            let updated = insert_text(txn, &caret, "Hello").unwrap();
            txn.set_selection(Some(BaseSelection::Range(updated)));
        })
        .unwrap();

    let state = editor.get_editor_state();
    let p = state.node(state.root().children[0]).unwrap().as_element().unwrap();
    let text_key = p.children[0];
    let text = state.node(text_key).unwrap().as_text().unwrap();
    assert_eq!(text.text, "Hello");
    assert_eq!(text.text.encode_utf16().count(), 5);

    let mut cache = RangeCache::new();
    let mut fw = FenwickTree::new(2);
    let idx = cache.allocate_node_index();
    cache.set(text_key, RangeCacheItem { node_index: idx, text_length: 5, ..Default::default() });
    fw.update(idx, 5);
    let point = point_at_string_location(&state, &cache, &fw, 5, Affinity::Backward).unwrap();
    assert_eq!(point.offset, 5);
}

/// S2 — Adjacent text merge. Build a paragraph with two Text children
/// `"ab"` and `"cd"`, same format. After normalization, the paragraph
/// has one Text child with `text == "abcd"` and `textLength == 4`; the
/// other child's key is absent from `rangeCache` (modeled here as: the
/// second child no longer appears anywhere in the committed tree).
#[test]
fn s2_adjacent_text_merge() {
    let mut editor = editor_with_mode(ReconcilerMode::Legacy);
    let mut second_key = ROOT_KEY;
    editor
        .update(|txn| {
            let p = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
            txn.create_text(p, "ab", TextFormat::empty()).unwrap();
            let second = txn.create_text(p, "cd", TextFormat::empty()).unwrap();
            second_key = second;
        })
        .unwrap();

    let state = editor.get_editor_state();
    let p = state.node(state.root().children[0]).unwrap().as_element().unwrap();
    assert_eq!(p.children.len(), 1);
    let merged = state.node(p.children[0]).unwrap().as_text().unwrap();
    assert_eq!(merged.text, "abcd");
    assert_eq!(merged.text.encode_utf16().count(), 4);
    assert!(state.node(second_key).is_none());
}

/// S3 — Fenwick prefix sum. Build three Text nodes with lengths `[10,
/// 20, 15]`. Expected: `prefix_sum(0)=10, prefix_sum(1)=30,
/// prefix_sum(2)=45`; `findFirstIndexWithPrefix(25) == 1`.
#[test]
fn s3_fenwick_prefix_sum() {
    let mut fw = FenwickTree::new(3);
    fw.update(0, 10);
    fw.update(1, 20);
    fw.update(2, 15);

    assert_eq!(fw.prefix_sum(0), 10);
    assert_eq!(fw.prefix_sum(1), 30);
    assert_eq!(fw.prefix_sum(2), 45);
    assert_eq!(fw.find_first_index_with_prefix(25), Some(1));
}

/// S4 — Paragraph boundary selection. Two paragraphs, `"A"` and `"B"`,
/// storage `"A\nB"`. Point `{key=p2, offset=0, kind=element}` maps to
/// absolute location `2`; `pointAtStringLocation(2, forward)` returns a
/// text point in the second paragraph at offset `0`.
#[test]
fn s4_paragraph_boundary_selection() {
    let (mut editor, frontend) = editor_with_recording_frontend(ReconcilerMode::Legacy);
    editor
        .update(|txn| {
            let p1 = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
            txn.create_text(p1, "A", TextFormat::empty()).unwrap();
            let p2 = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
            txn.create_text(p2, "B", TextFormat::empty()).unwrap();
        })
        .unwrap();

    assert_eq!(frontend.text(), "A\nB");

    let state = editor.get_editor_state();
    let p2 = state.root().children[1];
    let t2 = state.node(p2).unwrap().as_element().unwrap().children[0];

    editor.with_index(|cache, fw| {
        let loc = string_location_for_point(&state, cache, fw, Point::element(p2, 0)).unwrap();
        assert_eq!(loc, 2);

        let point = point_at_string_location(&state, cache, fw, 2, Affinity::Forward).unwrap();
        assert_eq!(point.key, t2);
        assert_eq!(point.offset, 0);
    });
}

/// S5 — Backspace at start of list-item. Two list-items with text `"X"`
/// and `"Y"`. Caret at `{text, key=y, offset=0}`. Dispatching
/// `DELETE_CHARACTER{backward}` leaves one list-item with text `"XY"`;
/// caret at `{text, key=x, offset=1}`.
#[test]
fn s5_backspace_at_start_of_list_item() {
    use scribe_core::node::element::ListType;

    let mut editor = editor_with_mode(ReconcilerMode::Legacy);
    let mut x_key = ROOT_KEY;
    editor
        .update(|txn| {
            let list = txn.create_element(Some(ROOT_KEY), ElementKind::List { list_type: ListType::Bullet, start: 1 }).unwrap();
            let item_x = txn.create_element(Some(list), ElementKind::ListItem { value: 1, checked: None }).unwrap();
            let tx = txn.create_text(item_x, "X", TextFormat::empty()).unwrap();
            x_key = tx;
            let item_y = txn.create_element(Some(list), ElementKind::ListItem { value: 2, checked: None }).unwrap();
            let ty = txn.create_text(item_y, "Y", TextFormat::empty()).unwrap();

            let caret = RangeSelection::collapsed(Point::text(ty, 0));
            let updated = delete_character(txn, &caret, false).unwrap();
            txn.set_selection(Some(BaseSelection::Range(updated.clone())));

            assert_eq!(updated.anchor.key, x_key);
            assert_eq!(updated.anchor.offset, 1);
        })
        .unwrap();

    let state = editor.get_editor_state();
    let list = state.root().children[0];
    let list_node = state.node(list).unwrap().as_element().unwrap();
    assert_eq!(list_node.children.len(), 1);
    let item = state.node(list_node.children[0]).unwrap().as_element().unwrap();
    let text = state.node(item.children[0]).unwrap().as_text().unwrap();
    assert_eq!(text.text, "XY");
}

/// S6 — Optimized vs legacy parity. Runs the same edit sequence
/// (insert-text, split-paragraph-equivalent, delete-character,
/// toggle-bold) against two editors differing only in reconciler mode
/// and asserts identical final storage strings.
#[test]
fn s6_optimized_vs_legacy_parity() {
    fn run(mode: ReconcilerMode) -> String {
        let (mut editor, frontend) = editor_with_recording_frontend(mode);
        editor
            .update(|txn| {
                let p = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
                let caret = RangeSelection::collapsed(Point::element(p, 0));
                let after_insert = insert_text(txn, &caret, "hello world").unwrap();
                txn.set_selection(Some(BaseSelection::Range(after_insert)));
            })
            .unwrap();

        editor
            .update(|txn| {
                let state_root = txn.get_node(ROOT_KEY).unwrap();
                let p = state_root.children()[0];
                let text_key = txn.get_node(p).unwrap().children()[0];

                // split-paragraph: break "hello world" into "hello" and
                // "world" under a new sibling paragraph.
                let split_at = 5u32;
                let new_para = txn.create_element(Some(ROOT_KEY), ElementKind::Paragraph).unwrap();
                txn.insert_after(p, new_para).unwrap();
                let tail = {
                    let node = txn.get_node_mut(text_key).unwrap();
                    let t = node.as_text_mut().unwrap();
                    let tail = t.text.split_off(split_at as usize);
                    tail
                };
                let tail = tail.trim_start().to_string();
                txn.create_text(new_para, tail, TextFormat::empty()).unwrap();

                // delete-character: backspace the leading space left on
                // the second paragraph's text, a no-op here since it was
                // already trimmed above; instead delete the trailing "d".
                let second_text = txn.get_node(new_para).unwrap().children()[0];
                let caret = RangeSelection::collapsed(Point::text(second_text, 4));
                let after_delete = delete_character(txn, &caret, true).unwrap();
                txn.set_selection(Some(BaseSelection::Range(after_delete)));

                // toggle-bold on the first paragraph's remaining text.
                let node = txn.get_node_mut(text_key).unwrap();
                let t = node.as_text_mut().unwrap();
                t.format.toggle(TextFormat::BOLD);
            })
            .unwrap();

        frontend.text()
    }

    let legacy = run(ReconcilerMode::Legacy);
    let optimized = run(ReconcilerMode::Optimized);
    assert_eq!(legacy, optimized);
    assert_eq!(legacy, "hello\nworl");
}
