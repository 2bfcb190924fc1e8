//! Per-reconcile metrics and diagnostics (spec §5, §9; `SPEC_FULL.md`
//! ambient-stack "Logging" section).
//!
//! Grounded on `Alb-O-xeno`'s `tracing` usage in `shared_state/apply.rs`:
//! structured spans around a state-applying pipeline stage, emitted
//! whether or not anything is actually listening.

use crate::fenwick::FenwickTree;
use crate::range_cache::RangeCache;
use crate::reconciler::ReconcilerKind;
use crate::state::EditorState;

/// One record per `Editor::update` reconcile pass.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub duration_ns: u64,
    pub delta_count: u32,
    pub fenwick_ops: u32,
    pub reconciler_kind: Option<ReconcilerKind>,
    /// Set when `optimized` mode reported `PartialSuccess` and the
    /// transaction still committed (spec §7 propagation policy).
    pub partial_failure: bool,
    pub nodes_processed: u32,
    pub ranges_added: u32,
    pub ranges_deleted: u32,
}

/// Diagnostic feature flags (spec §6 `EditorConfig.diagnostics`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticsConfig {
    pub verbose_logs: bool,
    /// `dark_launch` mode: compare optimized vs. legacy final text and
    /// selection and log a parity mismatch.
    pub selection_parity: bool,
    /// Gates `DiagnosticsSink::record_metrics`; off by default since a
    /// per-update `tracing::debug!` is wasted work on a host that isn't
    /// subscribed to it.
    pub metrics: bool,
    /// Runs `run_sanity_checks` after every commit and fails the update
    /// with `ReconcilerInvariantViolation` on mismatch. Expensive (walks
    /// the whole tree); meant for tests and early rollout, not production.
    pub sanity_checks: bool,
}

/// A detected mismatch between the optimized and legacy reconcilers
/// under `dark_launch` mode.
#[derive(Debug, Clone)]
pub struct ParityMismatch {
    pub description: String,
}

/// Receives `Metrics` and parity diagnostics. The default sink only logs
/// via `tracing`; hosts that want aggregation implement their own.
pub trait DiagnosticsSink: Send + Sync {
    fn record_metrics(&self, metrics: &Metrics) {
        tracing::debug!(
            duration_ns = metrics.duration_ns,
            delta_count = metrics.delta_count,
            fenwick_ops = metrics.fenwick_ops,
            reconciler_kind = ?metrics.reconciler_kind,
            partial_failure = metrics.partial_failure,
            "editor reconcile"
        );
    }

    fn record_parity_mismatch(&self, mismatch: &ParityMismatch) {
        tracing::warn!(description = %mismatch.description, "dark_launch parity mismatch");
    }
}

#[derive(Debug, Default)]
pub struct TracingDiagnosticsSink;

impl DiagnosticsSink for TracingDiagnosticsSink {}

/// Post-commit invariant verification (spec §6 `diagnostics.sanity_checks`):
/// invariant 2/3's parent-child consistency plus a cross-check that the
/// range cache and Fenwick tree actually agree with each other and with
/// the committed tree shape. Returns the first violation found.
pub fn run_sanity_checks(pending: &EditorState, cache: &RangeCache, fenwick: &FenwickTree) -> Result<(), String> {
    pending.check_parent_child_consistency()?;
    check_range_cache_fenwick_consistency(pending, cache, fenwick)
}

/// Every live node must own exactly one range-cache entry whose
/// `node_index` maps back to it, whose `children_length` equals the sum
/// of its children's `total_contribution`, and whose aggregate
/// `own_contribution`s sum to the Fenwick tree's total (spec invariant 6).
fn check_range_cache_fenwick_consistency(pending: &EditorState, cache: &RangeCache, fenwick: &FenwickTree) -> Result<(), String> {
    let mut total_own = 0i64;
    for key in pending.preorder_keys() {
        let item = cache.get(key).ok_or_else(|| format!("{key} has no range cache entry"))?;
        if cache.key_for_index(item.node_index) != Some(key) {
            return Err(format!("{key}'s node_index {} does not map back to it", item.node_index));
        }
        let node = pending.node(key).ok_or_else(|| format!("{key} missing from node map"))?;
        let expected_children_length: u32 = node.children().iter().filter_map(|&c| cache.get(c)).map(|c| c.total_contribution()).sum();
        if item.children_length != expected_children_length {
            return Err(format!("{key}'s children_length {} does not match its children's total_contribution sum {}", item.children_length, expected_children_length));
        }
        total_own += item.own_contribution() as i64;
    }
    if fenwick.total_sum() != total_own {
        return Err(format!("fenwick total_sum {} does not match range cache own_contribution sum {}", fenwick.total_sum(), total_own));
    }
    Ok(())
}
