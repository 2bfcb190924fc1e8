//! The `Editor`: owns committed state, dispatches updates through
//! `Transaction`, runs the reconciler, and routes commands (spec §4.1).
//!
//! Grounded on `Doc`'s `ArcSwap<Tree>` + `SegQueue<Edit>` shape
//! (`tree.rs`), generalized from a single buffered-edit queue into a
//! full transaction body plus a *nested*-update queue for reentrancy
//! (spec §4.1/§5: an `update` called from inside a command listener or
//! node hook doesn't reenter, it queues behind the current one).

use crate::command::{CommandListener, CommandPayload, CommandPriority, CommandRegistry, CommandType, ListenerHandle, ListenerResult};
use crate::error::{EditorError, EditorResult};
use crate::fenwick::FenwickTree;
use crate::frontend::{DecoratorCacheState, Frontend};
use crate::key::{KeyGenerator, NodeKey};
use crate::metrics::{DiagnosticsConfig, DiagnosticsSink, Metrics, TracingDiagnosticsSink};
use crate::node::Node;
use crate::plugin::Plugin;
use crate::range_cache::RangeCache;
use crate::reconciler::{self, ReconcilerMode};
use crate::state::{self, EditorState};
use crate::transaction::{DirtyCause, DirtySet, Transaction};
use arc_swap::ArcSwap;
use crossbeam::queue::SegQueue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Host-configurable behavior (spec §6). Serializable so a host can load
/// it through its own config format; the core never reads a file.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EditorConfig {
    pub reconciler_mode: ReconcilerMode,
    #[serde(skip)]
    pub diagnostics: DiagnosticsConfig,
    /// Opaque to the core: theme name -> (property -> value).
    pub theme: HashMap<String, HashMap<String, String>>,
    /// Whether `DELETE_CHARACTER{forward}` at a suppressed trailing
    /// newline rings the host's bell instead of silently no-opping
    /// (resolved Open Question 3, `SPEC_FULL.md` §3).
    pub ring_bell_on_noop_delete: bool,
    #[serde(skip)]
    pub plugins: Vec<Box<dyn Plugin>>,
}

impl std::fmt::Debug for EditorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorConfig")
            .field("reconciler_mode", &self.reconciler_mode)
            .field("theme_count", &self.theme.len())
            .field("ring_bell_on_noop_delete", &self.ring_bell_on_noop_delete)
            .field("plugin_count", &self.plugins.len())
            .finish()
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { reconciler_mode: ReconcilerMode::default(), diagnostics: DiagnosticsConfig::default(), theme: HashMap::new(), ring_bell_on_noop_delete: false, plugins: Vec::new() }
    }
}

/// Registered callback fired after every successfully committed update
/// (spec §4.1 "notifies update listeners").
pub type UpdateListener = Arc<dyn Fn(&EditorState, &EditorState) + Send + Sync>;

pub struct Editor {
    committed: ArcSwap<EditorState>,
    key_gen: KeyGenerator,
    command_registry: CommandRegistry,
    update_listeners: Mutex<Vec<UpdateListener>>,
    nested: SegQueue<Box<dyn FnOnce(&mut Editor) + Send>>,
    /// Guards the one piece of truly mutable shared state: whether an
    /// update is currently in flight, so reentrant `update` calls queue
    /// instead of reentering (`Doc`'s pending-edit buffer generalized to
    /// a boolean gate, since this editor's "pending edit" is a whole
    /// transaction body rather than a single `Edit` value).
    in_update: Mutex<bool>,
    frontend: Box<dyn Frontend>,
    cache: Mutex<RangeCache>,
    fenwick: Mutex<FenwickTree>,
    storage_len: Mutex<u32>,
    /// One lifecycle slot per Decorator node's host-owned view (spec §9),
    /// transitioned on insert/move/remove as part of every commit.
    decorator_cache: Mutex<HashMap<NodeKey, DecoratorCacheState>>,
    pub config: EditorConfig,
    diagnostics: Box<dyn DiagnosticsSink>,
}

impl Editor {
    pub fn new(frontend: Box<dyn Frontend>, config: EditorConfig) -> Self {
        let state = EditorState::empty();
        let mut editor = Self {
            committed: ArcSwap::from_pointee(state),
            key_gen: KeyGenerator::new(),
            command_registry: CommandRegistry::new(),
            update_listeners: Mutex::new(Vec::new()),
            nested: SegQueue::new(),
            in_update: Mutex::new(false),
            frontend,
            cache: Mutex::new(RangeCache::new()),
            fenwick: Mutex::new(FenwickTree::new(1)),
            storage_len: Mutex::new(0),
            decorator_cache: Mutex::new(HashMap::new()),
            config,
            diagnostics: Box::new(TracingDiagnosticsSink),
        };

        let plugins = std::mem::take(&mut editor.config.plugins);
        for plugin in &plugins {
            plugin.set_up(&mut editor);
        }
        editor.config.plugins = plugins;
        editor
    }

    pub fn get_editor_state(&self) -> Arc<EditorState> {
        self.committed.load_full()
    }

    /// Mints a fresh key outside of any transaction. Used by
    /// `EditorState::from_json`, which reconstructs a tree whose keys
    /// were never part of the serialized form (spec §4.8).
    pub fn allocate_key(&self) -> crate::key::NodeKey {
        self.key_gen.next_key()
    }

    /// Replaces the committed state wholesale (e.g. loading a document),
    /// bypassing the reconciler. The host is responsible for resetting
    /// its own storage to match.
    pub fn set_editor_state(&self, state: EditorState) {
        self.committed.store(Arc::new(state));
        *self.cache.lock() = RangeCache::new();
        *self.fenwick.lock() = FenwickTree::new(1);
        *self.storage_len.lock() = 0;
        self.decorator_cache.lock().clear();
    }

    /// Runs `body` against a read-only snapshot of the committed state.
    /// Nested reads are free (no lock is held across the call); this
    /// mirrors `Doc::read`'s lock-free `ArcSwap::load_full`.
    pub fn read<R>(&self, body: impl FnOnce(&EditorState) -> R) -> R {
        let snapshot = self.committed.load_full();
        body(&snapshot)
    }

    /// Runs `body` against the committed range cache and Fenwick tree,
    /// for host code doing its own offset queries via
    /// `selection::point_at_string_location`/`string_location_for_point`.
    pub fn with_index<R>(&self, body: impl FnOnce(&RangeCache, &FenwickTree) -> R) -> R {
        let cache = self.cache.lock();
        let fenwick = self.fenwick.lock();
        body(&cache, &fenwick)
    }

    /// Runs `body` against a mutable pending copy of the committed state,
    /// normalizes, reconciles, and commits on success (spec §4.1).
    ///
    /// Calling `update` from inside a running `update` (e.g. from a
    /// command listener) does not reenter: it queues `body` behind the
    /// current transaction via `enqueue_nested` and returns immediately
    /// once the current transaction finishes committing.
    pub fn update(&mut self, body: impl FnOnce(&mut Transaction) + Send + 'static) -> EditorResult<Metrics> {
        {
            let mut in_update = self.in_update.lock();
            if *in_update {
                drop(in_update);
                self.nested.push(Box::new(move |editor: &mut Editor| {
                    let _ = editor.run_update(body);
                }));
                return Ok(Metrics::default());
            }
            *in_update = true;
        }

        let result = self.run_update(body);
        *self.in_update.lock() = false;
        self.drain_nested();
        result
    }

    fn run_update(&mut self, body: impl FnOnce(&mut Transaction) + Send + 'static) -> EditorResult<Metrics> {
        let span = tracing::debug_span!("editor_update", mode = ?self.config.reconciler_mode);
        let _enter = span.enter();

        let committed = self.committed.load_full();
        let mut pending = (*committed).clone();
        let mut dirty: DirtySet = DirtySet::default();

        {
            let mut txn = Transaction::new(&mut pending, &mut dirty, &self.key_gen, &self.nested);
            body(&mut txn);
        }

        crate::transaction::normalize(&mut pending, &mut dirty);

        if dirty.is_empty() {
            return Ok(Metrics::default());
        }

        let live = state::garbage_collect(&mut pending);
        dirty.retain(|k, cause| *cause != crate::transaction::DirtyCause::Removed || !live.contains(k));

        let mut cache = self.cache.lock();
        let mut fenwick = self.fenwick.lock();
        let mut storage_len = self.storage_len.lock();

        let (new_len, metrics) = reconciler::reconcile(self.config.reconciler_mode, &committed, &pending, &dirty, &mut cache, &mut fenwick, self.frontend.as_mut(), *storage_len, self.diagnostics.as_ref());
        *storage_len = new_len;

        if self.config.diagnostics.sanity_checks {
            if let Err(reason) = crate::metrics::run_sanity_checks(&pending, &cache, &fenwick) {
                drop(cache);
                drop(fenwick);
                drop(storage_len);
                return Err(EditorError::ReconcilerInvariantViolation(reason));
            }
        }

        drop(cache);
        drop(fenwick);
        drop(storage_len);

        if metrics.partial_failure && !self.config.reconciler_mode_allows_partial() {
            return Err(EditorError::DeltaApplicationFailure { reason: "optimized reconciler reported a partial failure".to_string() });
        }

        if self.config.diagnostics.metrics {
            self.diagnostics.record_metrics(&metrics);
        }

        self.update_decorator_cache(&committed, &pending, &dirty);

        for listener in self.update_listeners.lock().iter() {
            listener(&committed, &pending);
        }
        self.committed.store(Arc::new(pending));

        Ok(metrics)
    }

    /// Drives `decoratorCache` transitions for every dirty Decorator node
    /// this commit (spec §9): created nodes start at `NeedsCreation`,
    /// removed nodes unmount, and moved nodes (the only other mutation a
    /// Decorator node can undergo — a move re-parents it via
    /// `Transaction::insert_before`/`insert_after`) remount.
    fn update_decorator_cache(&self, committed: &EditorState, pending: &EditorState, dirty: &DirtySet) {
        let mut cache = self.decorator_cache.lock();
        for (&key, &cause) in dirty.iter() {
            let is_decorator = pending
                .node(key)
                .or_else(|| committed.node(key))
                .map(|n| matches!(n.as_ref(), Node::Decorator(_)))
                .unwrap_or(false);
            if !is_decorator {
                continue;
            }
            match cause {
                DirtyCause::Created => {
                    cache.entry(key).or_insert_with(DecoratorCacheState::default);
                }
                DirtyCause::Removed => {
                    if let Some(state) = cache.remove(&key) {
                        cache.insert(key, state.on_unmount());
                    }
                }
                DirtyCause::Mutated => {
                    if let Some(state) = cache.remove(&key) {
                        cache.insert(key, state.on_remount());
                    }
                }
            }
        }
    }

    fn drain_nested(&mut self) {
        while let Some(f) = self.nested.pop() {
            f(self);
        }
    }

    pub fn register_update_listener(&self, listener: UpdateListener) {
        self.update_listeners.lock().push(listener);
    }

    pub fn register_command(&mut self, command: CommandType, priority: CommandPriority, listener: CommandListener) -> ListenerHandle {
        self.command_registry.register(command, priority, listener)
    }

    pub fn remove_command_listener(&mut self, handle: ListenerHandle) {
        self.command_registry.remove(handle);
    }

    /// Dispatches `command` to registered listeners in descending
    /// priority, short-circuiting on `Handled` (spec §4.1). Listeners are
    /// snapshotted as `Arc` clones before the loop (`CommandRegistry::
    /// snapshot_listeners`'s doc comment explains why: a listener may
    /// call back into `self.command_registry` and can't do so while the
    /// registry itself is borrowed).
    pub fn dispatch_command(&mut self, command: CommandType, payload: CommandPayload) -> ListenerResult {
        let listeners = self.command_registry.snapshot_listeners(&command);
        for listener in listeners {
            if self.config.diagnostics.verbose_logs {
                tracing::trace!(command = command.0, "dispatching to listener");
            }
            if listener(self, &payload) == ListenerResult::Handled {
                return ListenerResult::Handled;
            }
        }
        ListenerResult::Ignored
    }

    pub fn frontend_mut(&mut self) -> &mut dyn Frontend {
        self.frontend.as_mut()
    }

    /// The decorator view-cache lifecycle state for `key`, if it has ever
    /// been materialized as a Decorator node (spec §9).
    pub fn decorator_cache_state(&self, key: NodeKey) -> Option<DecoratorCacheState> {
        self.decorator_cache.lock().get(&key).cloned()
    }
}

impl EditorConfig {
    fn reconciler_mode_allows_partial(&self) -> bool {
        matches!(self.reconciler_mode, ReconcilerMode::DarkLaunch)
    }
}
