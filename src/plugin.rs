//! The `Plugin` extension point (spec §9, `SPEC_FULL.md` §1 supplemental
//! features). Concrete plugins (list/link/syntax-highlight, undo/redo)
//! are out of scope; this is the seam they'd attach through.
//!
//! Grounded on the teacher's `unified_plugin_example.rs` / SDK plugin
//! trait shape (a single setup hook taking the host object), generalized
//! from the teacher's GPU-facing plugin surface to this crate's
//! `Editor`-facing one.

use crate::editor::Editor;

/// Given to `Editor::new` via `EditorConfig::plugins`; `set_up` runs once
/// at construction, after the editor's command registry and frontend are
/// in place, so plugins can register commands and listeners immediately.
pub trait Plugin {
    fn set_up(&self, editor: &mut Editor);
}

impl std::fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Plugin")
    }
}
