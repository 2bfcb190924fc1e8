//! Core of a Lexical-style rich-text editor framework: a node tree,
//! copy-on-write transactions, an offset-indexing substrate (range
//! cache + Fenwick tree), two interchangeable reconciler strategies,
//! and the narrow `Frontend` seam a host's text storage plugs into.
//!
//! This crate has no UI, no IME handling, and no concrete plugins
//! (list/link/syntax-highlight, undo/redo) — those consume this API but
//! contribute no core algorithm (see `DESIGN.md`).

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod command;
pub mod editor;
pub mod error;
pub mod fenwick;
pub mod frontend;
pub mod key;
pub mod metrics;
pub mod node;
pub mod plugin;
pub mod range_cache;
pub mod reconciler;
pub mod selection;
pub mod serialize;
pub mod state;
pub mod transaction;

pub use editor::{Editor, EditorConfig, UpdateListener};
pub use error::{EditorError, EditorResult};
pub use key::{KeyGenerator, NodeKey, ROOT_KEY};
pub use node::Node;
pub use reconciler::ReconcilerMode;
pub use selection::{BaseSelection, Point, PointKind, RangeSelection};
pub use state::EditorState;
pub use transaction::Transaction;
