//! Stage 4 — range cache & Fenwick update (spec §4.5).
//!
//! Idempotence (spec §4.5 "Idempotence"): every update here is keyed by
//! the delta's own node identity and always overwrites cache fields to
//! the value implied by the delta's content, then adjusts the Fenwick
//! slot by `new_own_contribution - old_own_contribution` (reading the
//! *old* value from the cache entry being overwritten, not from a
//! running accumulator). Re-running the same delta a second time
//! recomputes the identical new value, so the second Fenwick adjustment
//! is zero — applying a batch twice converges to the same state as
//! applying it once.

use super::delta::ReconcilerDelta;
use crate::fenwick::FenwickTree;
use crate::range_cache::{RangeCache, RangeCacheItem};

pub fn apply_cache_update(delta: &ReconcilerDelta, cache: &mut RangeCache, fenwick: &mut FenwickTree) {
    match delta {
        ReconcilerDelta::TextUpdate { node_key, new_text, .. } => {
            let new_text_len = new_text.encode_utf16().count() as u32;
            let Some(existing) = cache.get(*node_key).copied() else { return };
            let old_own = existing.own_contribution();
            let updated = RangeCacheItem { text_length: new_text_len, ..existing };
            let new_own = updated.own_contribution();
            cache.set(*node_key, updated);
            fenwick.update(existing.node_index, new_own as i64 - old_own as i64);
        }
        ReconcilerDelta::NodeInsertion { node_key, preamble, content, postamble, node_index, .. } => {
            let preamble_length = preamble.encode_utf16().count() as u32;
            let text_length = content.encode_utf16().count() as u32;
            let postamble_length = postamble.encode_utf16().count() as u32;
            if cache.contains(*node_key) {
                // Already materialized by an earlier application of this
                // same delta; idempotent no-op.
                return;
            }
            let item = RangeCacheItem { preamble_length, children_length: 0, text_length, postamble_length, node_index: *node_index };
            let own = item.own_contribution();
            cache.set(*node_key, item);
            fenwick.update(*node_index, own as i64);
        }
        ReconcilerDelta::NodeDeletion { node_key, .. } => {
            if let Some(item) = cache.remove(*node_key) {
                fenwick.update(item.node_index, -(item.own_contribution() as i64));
            }
        }
        ReconcilerDelta::AttributeChange { .. } => {
            // Attributes aren't modeled in RangeCacheItem; storage already
            // carries them via the applier's `setAttributes` call.
        }
        ReconcilerDelta::AnchorUpdate { .. } => {
            // No length change; cached preamble/postamble locations are
            // derived on demand from the Fenwick tree, not stored.
        }
    }
}
