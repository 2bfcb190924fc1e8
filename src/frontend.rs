//! The narrow external contract the core depends on (spec §4.7): a host
//! owns the actual attributed-string storage and native selection/IME
//! surfaces; the core only ever talks to it through this trait.
//!
//! Grounded on the teacher's `widget.rs` cache-of-opaque-view pattern
//! (`TextWidget` owning GPU resource handles opaquely, created/destroyed
//! by the render layer on demand) generalized to the spec's four-state
//! `DecoratorCacheState` with no GPU coupling at all.

use crate::selection::{BaseSelection, Granularity, ModifyMode, MoveDirection};

/// Absolute `[start, end)` UTF-16 code-unit range in the host's flat
/// attributed string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageRange {
    pub start: u32,
    pub end: u32,
}

impl StorageRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Opaque attribute bag applied to a storage range; the core never
/// inspects values, only passes through what a node's effective style
/// computation produced.
pub type AttributeMap = std::collections::HashMap<String, String>;

/// A run of text plus the attributes to paint it with, as handed to
/// `Frontend::insert`.
#[derive(Debug, Clone)]
pub struct AttributedString {
    pub text: String,
    pub attributes: AttributeMap,
}

/// Whether the host's storage should carry a synthetic trailing newline
/// after the document's last block (Open Question 1, `SPEC_FULL.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingNewlinePolicy {
    #[default]
    Omit,
    Always,
}

/// Opaque per-decorator view handle a `CachedView`/`UnmountedCachedView`
/// carries (spec §9): created by the frontend's own decorator rendering
/// and handed back to it; the core never looks inside.
pub type DecoratorView = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// Lifecycle of a Decorator node's host-owned view (spec §9).
#[derive(Debug, Clone, Default)]
pub enum DecoratorCacheState {
    #[default]
    NeedsCreation,
    NeedsDecorating,
    CachedView(DecoratorView),
    UnmountedCachedView(DecoratorView),
}

impl DecoratorCacheState {
    pub fn is_mounted(&self) -> bool {
        matches!(self, DecoratorCacheState::CachedView(_) | DecoratorCacheState::NeedsDecorating)
    }

    /// Transition on the decorator becoming reachable again after having
    /// been unmounted (e.g. a move bringing it back under a live parent).
    /// The existing view handle is dropped rather than carried into
    /// `NeedsDecorating` — the frontend recreates it on the next decorate
    /// pass, same as any other `NeedsDecorating` node.
    pub fn on_remount(self) -> Self {
        match self {
            DecoratorCacheState::UnmountedCachedView(_) => DecoratorCacheState::NeedsDecorating,
            other => other,
        }
    }

    pub fn on_unmount(self) -> Self {
        match self {
            DecoratorCacheState::CachedView(view) => DecoratorCacheState::UnmountedCachedView(view),
            DecoratorCacheState::NeedsDecorating => DecoratorCacheState::NeedsCreation,
            other => other,
        }
    }
}

/// Host-provided container the decorator's view mounts into. The core
/// never looks inside it.
pub type DecoratorHost = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// The external contract described in spec §4.7.
///
/// `is_updating_native_selection` is a re-entry guard: the core sets it
/// while writing a selection it derived itself, so the host's own
/// selection-changed feedback callback can tell "I caused this" from "the
/// user caused this" and avoid bouncing the write back in.
pub trait Frontend {
    fn replace(&mut self, range: StorageRange, text: &str, attrs: &AttributeMap);
    fn delete(&mut self, range: StorageRange);
    fn insert(&mut self, location: u32, attributed: AttributedString);
    fn set_attributes(&mut self, attrs: &AttributeMap, range: StorageRange);

    fn update_native_selection(&mut self, from: &BaseSelection) -> Result<(), crate::error::EditorError>;
    fn move_native_selection(&mut self, mode: ModifyMode, direction: MoveDirection, granularity: Granularity) -> StorageRange;

    fn set_marked_text(&mut self, attributed: AttributedString, selected_range: StorageRange);
    fn unmark_text(&mut self);

    fn view_for_decorators(&self) -> DecoratorHost;
    fn text_layout_width(&self) -> f32;

    fn is_updating_native_selection(&self) -> bool;
    fn set_updating_native_selection(&mut self, updating: bool);

    fn trailing_newline_policy(&self) -> TrailingNewlinePolicy {
        TrailingNewlinePolicy::default()
    }
}
