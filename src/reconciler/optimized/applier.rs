//! Stage 3 — text-storage applier (spec §4.5).

use super::delta::{DeltaBatch, ReconcilerDelta};
use crate::frontend::{AttributedString, AttributeMap, Frontend, StorageRange};

#[derive(Debug)]
pub enum DeltaApplicationResult {
    Success { applied: u32, fenwick_ops: u32 },
    PartialSuccess { applied: u32, failed: Vec<ReconcilerDelta>, reason: String },
    Failure { reason: String },
}

/// Applies `batch.deltas` (already stable-sorted) to `frontend` in order.
/// Validates each delta's range against `running_length` before applying
/// it so a delta referencing storage past the document's current end is
/// rejected rather than silently corrupting state.
///
/// On `Failure`, storage is left exactly as it was (no delta is applied
/// yet — the first delta failed validation). On `PartialSuccess`, every
/// delta up to the first failure has already been applied to `frontend`
/// and is not retried.
pub fn apply_batch(batch: &DeltaBatch, frontend: &mut dyn Frontend) -> DeltaApplicationResult {
    let mut running_length = batch.meta.expected_text_storage_length;
    let mut applied = 0u32;
    let mut failed = Vec::new();
    let mut failure_reason: Option<String> = None;

    for delta in &batch.deltas {
        if failure_reason.is_some() {
            failed.push(delta.clone());
            continue;
        }
        match validate(delta, running_length) {
            Ok(new_length) => {
                apply_one(delta, frontend);
                running_length = new_length;
                applied += 1;
            }
            Err(reason) => {
                failure_reason = Some(reason);
                failed.push(delta.clone());
            }
        }
    }

    match failure_reason {
        None => DeltaApplicationResult::Success { applied, fenwick_ops: applied },
        Some(reason) if applied == 0 => DeltaApplicationResult::Failure { reason },
        Some(reason) => DeltaApplicationResult::PartialSuccess { applied, failed, reason },
    }
}

fn validate(delta: &ReconcilerDelta, running_length: u32) -> Result<u32, String> {
    match delta {
        ReconcilerDelta::NodeDeletion { range_in_storage, .. } => {
            if range_in_storage.end > running_length {
                return Err(format!("delete range {:?} exceeds storage length {running_length}", range_in_storage));
            }
            Ok(running_length - range_in_storage.len())
        }
        ReconcilerDelta::TextUpdate { range_in_storage, new_text, .. } => {
            if range_in_storage.end > running_length {
                return Err(format!("text update range {:?} exceeds storage length {running_length}", range_in_storage));
            }
            let new_len = new_text.encode_utf16().count() as u32;
            Ok(running_length - range_in_storage.len() + new_len)
        }
        ReconcilerDelta::NodeInsertion { preamble, content, postamble, location, .. } => {
            if *location > running_length {
                return Err(format!("insertion at {location} exceeds storage length {running_length}"));
            }
            let added = (preamble.encode_utf16().count() + content.encode_utf16().count() + postamble.encode_utf16().count()) as u32;
            Ok(running_length + added)
        }
        ReconcilerDelta::AttributeChange { range_in_storage, .. } => {
            if range_in_storage.end > running_length {
                return Err(format!("attribute range {:?} exceeds storage length {running_length}", range_in_storage));
            }
            Ok(running_length)
        }
        ReconcilerDelta::AnchorUpdate { .. } => Ok(running_length),
    }
}

fn apply_one(delta: &ReconcilerDelta, frontend: &mut dyn Frontend) {
    match delta {
        ReconcilerDelta::TextUpdate { new_text, range_in_storage, .. } => {
            frontend.replace(*range_in_storage, new_text, &AttributeMap::new());
        }
        ReconcilerDelta::NodeInsertion { preamble, content, postamble, location, .. } => {
            let mut text = String::with_capacity(preamble.len() + content.len() + postamble.len());
            text.push_str(preamble);
            text.push_str(content);
            text.push_str(postamble);
            frontend.insert(*location, AttributedString { text, attributes: AttributeMap::new() });
        }
        ReconcilerDelta::NodeDeletion { range_in_storage, .. } => {
            frontend.delete(*range_in_storage);
        }
        ReconcilerDelta::AttributeChange { attributes, range_in_storage, .. } => {
            frontend.set_attributes(attributes, *range_in_storage);
        }
        ReconcilerDelta::AnchorUpdate { .. } => {}
    }
}
