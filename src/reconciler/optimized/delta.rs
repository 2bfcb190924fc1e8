//! Reconciler delta types (spec §3.1, §4.5 Stage 2).

use crate::frontend::{AttributeMap, StorageRange};
use crate::key::NodeKey;

#[derive(Debug, Clone)]
pub enum ReconcilerDelta {
    TextUpdate { node_key: NodeKey, new_text: String, range_in_storage: StorageRange },
    /// `node_index` is pre-allocated at diff time (Stage 1), in pre-order
    /// over the inserted subtree, rather than at Stage 4 application
    /// time: Stage 4 processes deltas in the batch's final stable-sorted
    /// order (ascending `location`), but an inserted element's postamble
    /// necessarily lands *after* its children's insertions in storage
    /// order. Allocating indices at Stage 4 in that order would assign a
    /// child a lower `nodeIndex` than its parent, violating the
    /// ancestor-first indexing invariant (spec invariant 7). Pre-order
    /// allocation at diff time sidesteps the ordering conflict entirely.
    NodeInsertion { node_key: NodeKey, preamble: String, content: String, postamble: String, location: u32, node_index: usize },
    NodeDeletion { node_key: NodeKey, range_in_storage: StorageRange },
    AttributeChange { node_key: NodeKey, attributes: AttributeMap, range_in_storage: StorageRange },
    AnchorUpdate { node_key: NodeKey, preamble_location: u32, postamble_location: u32 },
}

impl ReconcilerDelta {
    pub fn node_key(&self) -> NodeKey {
        match self {
            ReconcilerDelta::TextUpdate { node_key, .. }
            | ReconcilerDelta::NodeInsertion { node_key, .. }
            | ReconcilerDelta::NodeDeletion { node_key, .. }
            | ReconcilerDelta::AttributeChange { node_key, .. }
            | ReconcilerDelta::AnchorUpdate { node_key, .. } => *node_key,
        }
    }

    /// Sort rank within a mixed batch (spec §4.5 Stage 2 ordering
    /// policy): deletions, then insertions, then text updates, then
    /// attribute changes, then anchor updates.
    fn rank(&self) -> u8 {
        match self {
            ReconcilerDelta::NodeDeletion { .. } => 0,
            ReconcilerDelta::NodeInsertion { .. } => 1,
            ReconcilerDelta::TextUpdate { .. } => 2,
            ReconcilerDelta::AttributeChange { .. } => 3,
            ReconcilerDelta::AnchorUpdate { .. } => 4,
        }
    }

    fn sort_location(&self) -> u32 {
        match self {
            ReconcilerDelta::NodeDeletion { range_in_storage, .. } => range_in_storage.start,
            ReconcilerDelta::NodeInsertion { location, .. } => *location,
            ReconcilerDelta::TextUpdate { range_in_storage, .. } => range_in_storage.start,
            ReconcilerDelta::AttributeChange { range_in_storage, .. } => range_in_storage.start,
            ReconcilerDelta::AnchorUpdate { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeltaBatchMeta {
    pub expected_text_storage_length: u32,
    pub requires_anchor_validation: bool,
    pub fallback_threshold: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DeltaBatch {
    pub deltas: Vec<ReconcilerDelta>,
    pub meta: DeltaBatchMeta,
}

impl DeltaBatch {
    /// Orders deltas per spec §4.5 Stage 2: deletions in descending
    /// `location`, then insertions ascending, then text updates
    /// ascending, then attribute changes, then anchor updates. Deletions
    /// are reversed (descending) so removing an earlier range doesn't
    /// shift the still-pending later ranges.
    pub fn stable_sort(&mut self) {
        self.deltas.sort_by(|a, b| {
            let (ra, rb) = (a.rank(), b.rank());
            if ra != rb {
                return ra.cmp(&rb);
            }
            if ra == 0 {
                b.sort_location().cmp(&a.sort_location())
            } else {
                a.sort_location().cmp(&b.sort_location())
            }
        });
    }
}
