//! Stable node identifiers.
//!
//! Keys are allocated from a monotonically increasing counter and are
//! never reused within an editor's lifetime (spec invariant: once
//! allocated, a key stays retired after the node is removed).

use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for a node, unique within one editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NodeKey(u64);

/// Sentinel key identifying the singleton root node.
pub const ROOT_KEY: NodeKey = NodeKey(0);

impl NodeKey {
    /// Returns the raw numeric value. Exposed for diagnostics and
    /// serialization; never meaningful across editor instances.
    pub fn raw(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(v: u64) -> NodeKey {
        NodeKey(v)
    }

    pub fn is_root(self) -> bool {
        self == ROOT_KEY
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "k{}", self.0)
    }
}

/// Monotonic key allocator. `ROOT_KEY` (0) is reserved, so the counter
/// starts at 1.
#[derive(Debug)]
pub struct KeyGenerator {
    next: AtomicU64,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    /// Allocate the next key. Never returns `ROOT_KEY` and never repeats.
    pub fn next_key(&self) -> NodeKey {
        NodeKey(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
