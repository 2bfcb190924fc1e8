//! Shared test fixtures: a `Frontend` that actually maintains a flat
//! UTF-16 buffer instead of discarding writes, so integration tests can
//! assert on the storage string a host would end up seeing.
//!
//! Grounded on the same `Frontend` shape `benches/reconciler_bench.rs`'s
//! `DiscardFrontend` implements, generalized from "discard everything"
//! to "actually apply it to a buffer" so round-trip scenarios have
//! something to assert against.
//!
//! `RecordingFrontend` is `Clone` (an `Arc<Mutex<..>>` handle) so a test
//! can keep a handle to read `.text()` back after handing the other
//! clone's `Box<dyn Frontend>` ownership to an `Editor`.

use scribe_core::error::EditorError;
use scribe_core::frontend::{AttributeMap, AttributedString, DecoratorHost, Frontend, StorageRange};
use scribe_core::selection::{BaseSelection, Granularity, ModifyMode, MoveDirection};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingState {
    buf: Vec<u16>,
    updating: bool,
    native_selection_writes: u32,
}

#[derive(Clone, Default)]
pub struct RecordingFrontend {
    inner: Arc<Mutex<RecordingState>>,
}

impl RecordingFrontend {
    pub fn text(&self) -> String {
        String::from_utf16_lossy(&self.inner.lock().unwrap().buf)
    }

    pub fn native_selection_writes(&self) -> u32 {
        self.inner.lock().unwrap().native_selection_writes
    }
}

impl Frontend for RecordingFrontend {
    fn replace(&mut self, range: StorageRange, text: &str, _attrs: &AttributeMap) {
        let encoded: Vec<u16> = text.encode_utf16().collect();
        self.inner.lock().unwrap().buf.splice(range.start as usize..range.end as usize, encoded);
    }

    fn delete(&mut self, range: StorageRange) {
        self.inner.lock().unwrap().buf.drain(range.start as usize..range.end as usize);
    }

    fn insert(&mut self, location: u32, attributed: AttributedString) {
        let encoded: Vec<u16> = attributed.text.encode_utf16().collect();
        self.inner.lock().unwrap().buf.splice(location as usize..location as usize, encoded);
    }

    fn set_attributes(&mut self, _attrs: &AttributeMap, _range: StorageRange) {}

    fn update_native_selection(&mut self, _from: &BaseSelection) -> Result<(), EditorError> {
        self.inner.lock().unwrap().native_selection_writes += 1;
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
        self.inner.lock().unwrap().updating
    }

    fn set_updating_native_selection(&mut self, updating: bool) {
        self.inner.lock().unwrap().updating = updating;
    }
}
