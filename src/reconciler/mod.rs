//! Reconciler mode dispatch (spec §4.4/§4.5/§9).
//!
//! Grounded on `Doc::flush`'s buffer-then-apply shape, generalized into
//! two interchangeable reconcile strategies plus a verification mode
//! that runs both and diffs their outputs.

pub mod legacy;
pub mod optimized;

use crate::frontend::Frontend;
use crate::metrics::{DiagnosticsSink, Metrics, ParityMismatch};
use crate::range_cache::RangeCache;
use crate::state::EditorState;
use crate::transaction::DirtySet;
use crate::fenwick::FenwickTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerKind {
    Legacy,
    Optimized,
}

/// Host-selected reconciler strategy (spec §6 `EditorConfig.reconciler_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ReconcilerMode {
    #[default]
    Legacy,
    Optimized,
    /// Runs `legacy` as the mutation authority (spec §4.5, §7: "in
    /// dark_launch mode, the legacy result is authoritative for text
    /// storage"), but also runs `optimized` against a scratch copy of
    /// cache/fenwick and a discarding `NullFrontend`, comparing final
    /// lengths and logging a `ParityMismatch` through `diagnostics` on
    /// divergence. The optimized pass never touches the committed result.
    DarkLaunch,
}

/// Dispatches one reconcile pass per `mode`. `old_total_len` is the
/// storage length before this pass, needed by `legacy`'s whole-range
/// replace.
pub fn reconcile(
    mode: ReconcilerMode,
    committed: &EditorState,
    pending: &EditorState,
    dirty: &DirtySet,
    cache: &mut RangeCache,
    fenwick: &mut FenwickTree,
    frontend: &mut dyn Frontend,
    old_total_len: u32,
    diagnostics: &dyn DiagnosticsSink,
) -> (u32, Metrics) {
    match mode {
        ReconcilerMode::Legacy => legacy::reconcile(pending, cache, fenwick, frontend, old_total_len),
        ReconcilerMode::Optimized => {
            let policy = frontend.trailing_newline_policy();
            let batch = optimized::build_batch(committed, pending, dirty, cache, fenwick, policy);
            let delta_count = batch.deltas.len() as u32;
            let result = optimized::apply_batch(&batch, cache, fenwick, frontend);
            let new_total = fenwick.total_sum().max(0) as u32;
            let metrics = metrics_from_result(&result, delta_count, ReconcilerKind::Optimized);
            (new_total, metrics)
        }
        ReconcilerMode::DarkLaunch => {
            // Spec §4.5/§7: legacy is the authoritative, committing pass;
            // optimized runs as a discarded shadow for comparison only. The
            // shadow pass diffs against the pre-transaction cache/fenwick
            // (captured before legacy rebuilds them in place), so it is
            // cloned first.
            let mut shadow_cache = cache.clone();
            let shadow_fenwick_seed = fenwick.clone();

            let (new_total, metrics) = legacy::reconcile(pending, cache, fenwick, frontend, old_total_len);

            let policy = frontend.trailing_newline_policy();
            let mut shadow_fenwick = shadow_fenwick_seed;
            let batch = optimized::build_batch(committed, pending, dirty, &mut shadow_cache, &shadow_fenwick, policy);
            let mut shadow_frontend = NullFrontend::default();
            optimized::apply_batch(&batch, &mut shadow_cache, &mut shadow_fenwick, &mut shadow_frontend);
            let shadow_len = shadow_fenwick.total_sum().max(0) as u32;
            if shadow_len != new_total {
                diagnostics.record_parity_mismatch(&ParityMismatch {
                    description: format!("legacy produced length {new_total}, optimized produced {shadow_len}"),
                });
            }

            (new_total, metrics)
        }
    }
}

/// Discards every write; used to run `legacy` as a shadow comparison
/// pass under `dark_launch` without touching the real host storage.
#[derive(Default)]
struct NullFrontend {
    updating_native_selection: bool,
}

impl Frontend for NullFrontend {
    fn replace(&mut self, _range: crate::frontend::StorageRange, _text: &str, _attrs: &crate::frontend::AttributeMap) {}
    fn delete(&mut self, _range: crate::frontend::StorageRange) {}
    fn insert(&mut self, _location: u32, _attributed: crate::frontend::AttributedString) {}
    fn set_attributes(&mut self, _attrs: &crate::frontend::AttributeMap, _range: crate::frontend::StorageRange) {}
    fn update_native_selection(&mut self, _from: &crate::selection::BaseSelection) -> Result<(), crate::error::EditorError> {
        Ok(())
    }
    fn move_native_selection(&mut self, _mode: crate::selection::ModifyMode, _direction: crate::selection::MoveDirection, _granularity: crate::selection::Granularity) -> crate::frontend::StorageRange {
        crate::frontend::StorageRange::new(0, 0)
    }
    fn set_marked_text(&mut self, _attributed: crate::frontend::AttributedString, _selected_range: crate::frontend::StorageRange) {}
    fn unmark_text(&mut self) {}
    fn view_for_decorators(&self) -> crate::frontend::DecoratorHost {
        std::sync::Arc::new(())
    }
    fn text_layout_width(&self) -> f32 {
        0.0
    }
    fn is_updating_native_selection(&self) -> bool {
        self.updating_native_selection
    }
    fn set_updating_native_selection(&mut self, updating: bool) {
        self.updating_native_selection = updating;
    }
}

fn metrics_from_result(result: &crate::reconciler::optimized::applier::DeltaApplicationResult, delta_count: u32, kind: ReconcilerKind) -> Metrics {
    use crate::reconciler::optimized::applier::DeltaApplicationResult;
    match result {
        DeltaApplicationResult::Success { applied, fenwick_ops } => {
            Metrics { delta_count, fenwick_ops: *fenwick_ops, reconciler_kind: Some(kind), nodes_processed: *applied, ranges_added: *applied, ..Default::default() }
        }
        DeltaApplicationResult::PartialSuccess { applied, failed, .. } => {
            Metrics { delta_count, reconciler_kind: Some(kind), nodes_processed: *applied, partial_failure: true, ranges_deleted: failed.len() as u32, ..Default::default() }
        }
        DeltaApplicationResult::Failure { .. } => Metrics { delta_count, reconciler_kind: Some(kind), partial_failure: true, ..Default::default() },
    }
}
