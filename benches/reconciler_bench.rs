//! Benchmarks comparing the legacy whole-tree reconciler against the
//! optimized delta pipeline (spec §4.4/§4.5) across document sizes and
//! edit shapes.
//!
//! Grounded on `tiny_editor`'s `bench_single_insert`/`bench_batched_edits`
//! (build a document, apply edits, flush, measure) generalized from a
//! flat rope edit to a tree mutation routed through `Editor::update`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use scribe_core::editor::{Editor, EditorConfig};
use scribe_core::frontend::{AttributeMap, AttributedString, DecoratorHost, Frontend, StorageRange};
use scribe_core::node::element::ElementKind;
use scribe_core::node::format::TextFormat;
use scribe_core::reconciler::ReconcilerMode;
use scribe_core::selection::{BaseSelection, Granularity, ModifyMode, MoveDirection};
use std::sync::Arc;

#[derive(Default)]
struct DiscardFrontend {
    updating: bool,
}

impl Frontend for DiscardFrontend {
    fn replace(&mut self, _range: StorageRange, _text: &str, _attrs: &AttributeMap) {}
    fn delete(&mut self, _range: StorageRange) {}
    fn insert(&mut self, _location: u32, _attributed: AttributedString) {}
    fn set_attributes(&mut self, _attrs: &AttributeMap, _range: StorageRange) {}
    fn update_native_selection(&mut self, _from: &BaseSelection) -> Result<(), scribe_core::error::EditorError> {
        Ok(())
    }
    fn move_native_selection(&mut self, _mode: ModifyMode, _direction: MoveDirection, _granularity: Granularity) -> StorageRange {
        StorageRange::new(0, 0)
    }
    fn set_marked_text(&mut self, _attributed: AttributedString, _selected_range: StorageRange) {}
    fn unmark_text(&mut self) {}
    fn view_for_decorators(&self) -> DecoratorHost {
        Arc::new(())
    }
    fn text_layout_width(&self) -> f32 {
        0.0
    }
    fn is_updating_native_selection(&self) -> bool {
        self.updating
    }
    fn set_updating_native_selection(&mut self, updating: bool) {
        self.updating = updating;
    }
}

/// Builds an editor with `paragraphs` paragraphs, each holding one text
/// node, under the given reconciler mode.
fn built_document(paragraphs: usize, mode: ReconcilerMode) -> Editor {
    let mut editor = Editor::new(Box::new(DiscardFrontend::default()), EditorConfig { reconciler_mode: mode, ..Default::default() });
    editor
        .update(move |txn| {
            let root = scribe_core::key::ROOT_KEY;
            for i in 0..paragraphs {
                let p = txn.create_element(Some(root), ElementKind::Paragraph).unwrap();
                txn.create_text(p, format!("paragraph number {i} with some representative body text"), TextFormat::empty()).unwrap();
            }
        })
        .unwrap();
    editor
}

/// Single text-node mutation in the middle of the document: the shape
/// the optimized pipeline is meant to win on (one `TextUpdate` delta vs.
/// a full rebuild).
fn bench_single_text_mutation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciler_single_text_mutation");
    for size in [10, 100, 1_000].iter() {
        for mode in [ReconcilerMode::Legacy, ReconcilerMode::Optimized] {
            group.bench_with_input(BenchmarkId::new(format!("{mode:?}"), size), size, |b, &size| {
                b.iter_batched(
                    || built_document(size, mode),
                    |mut editor| {
                        let state = editor.get_editor_state();
                        let mid_paragraph = state.root().children[size / 2];
                        let text_key = state.node(mid_paragraph).unwrap().children()[0];
                        editor
                            .update(move |txn| {
                                let node = txn.get_node_mut(text_key).unwrap();
                                if let Some(t) = node.as_text_mut() {
                                    t.text.push_str(" edited");
                                }
                            })
                            .unwrap();
                        std::hint::black_box(editor.get_editor_state());
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

/// Appending a new paragraph at the end: one subtree insertion vs. a
/// full rebuild.
fn bench_append_paragraph(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciler_append_paragraph");
    for size in [10, 100, 1_000].iter() {
        for mode in [ReconcilerMode::Legacy, ReconcilerMode::Optimized] {
            group.bench_with_input(BenchmarkId::new(format!("{mode:?}"), size), size, |b, &size| {
                b.iter_batched(
                    || built_document(size, mode),
                    |mut editor| {
                        editor
                            .update(|txn| {
                                let root = scribe_core::key::ROOT_KEY;
                                let p = txn.create_element(Some(root), ElementKind::Paragraph).unwrap();
                                txn.create_text(p, "appended paragraph", TextFormat::empty()).unwrap();
                            })
                            .unwrap();
                        std::hint::black_box(editor.get_editor_state());
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

/// Batched edits within one transaction (typing several characters into
/// the same update, like `bench_batched_edits`'s burst-of-keystrokes
/// shape).
fn bench_batched_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciler_batched_inserts");
    for mode in [ReconcilerMode::Legacy, ReconcilerMode::Optimized] {
        group.bench_function(format!("{mode:?}"), |b| {
            b.iter_batched(
                || built_document(100, mode),
                |mut editor| {
                    let state = editor.get_editor_state();
                    let text_key = state.node(state.root().children[50]).unwrap().children()[0];
                    editor
                        .update(move |txn| {
                            for ch in "the quick brown fox".chars() {
                                let node = txn.get_node_mut(text_key).unwrap();
                                if let Some(t) = node.as_text_mut() {
                                    t.text.push(ch);
                                }
                            }
                        })
                        .unwrap();
                    std::hint::black_box(editor.get_editor_state());
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_text_mutation, bench_append_paragraph, bench_batched_inserts);
criterion_main!(benches);
