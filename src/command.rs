//! Command dispatch (spec §4.1): typed command routing with priority-
//! ordered listeners and short-circuit on `Handled`.
//!
//! Grounded on `input.rs`'s `InputAction` enum and its `on_key` routing
//! switch, generalized from a fixed match arm per action into a
//! registered, priority-ordered listener table any plugin can extend.

use crate::editor::Editor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A command type discriminator. Newtype over a string so plugins can
/// register custom command types alongside the standard registry below
/// without the core needing to know about them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandType(pub &'static str);

pub mod command_types {
    use super::CommandType;

    pub const INSERT_TEXT: CommandType = CommandType("INSERT_TEXT");
    pub const DELETE_CHARACTER: CommandType = CommandType("DELETE_CHARACTER");
    pub const DELETE_WORD: CommandType = CommandType("DELETE_WORD");
    pub const DELETE_LINE: CommandType = CommandType("DELETE_LINE");
    pub const INSERT_PARAGRAPH: CommandType = CommandType("INSERT_PARAGRAPH");
    pub const INSERT_LINE_BREAK: CommandType = CommandType("INSERT_LINE_BREAK");
    pub const FORMAT_TEXT: CommandType = CommandType("FORMAT_TEXT");
    pub const INDENT: CommandType = CommandType("INDENT");
    pub const OUTDENT: CommandType = CommandType("OUTDENT");
    pub const PASTE: CommandType = CommandType("PASTE");
    pub const COPY: CommandType = CommandType("COPY");
    pub const CUT: CommandType = CommandType("CUT");
    pub const SELECTION_CHANGE: CommandType = CommandType("SELECTION_CHANGE");
}

/// Payload carried by a dispatched command. `Opaque` lets plugins pass
/// their own data through `dispatch_command` without a core-side enum
/// variant per plugin command.
#[derive(Debug, Clone)]
pub enum CommandPayload {
    None,
    Text(String),
    Forward(bool),
    Format(crate::node::format::TextFormat),
    Opaque(Arc<dyn std::any::Any + Send + Sync>),
}

pub type CommandPriority = i32;

pub const PRIORITY_LOW: CommandPriority = 0;
pub const PRIORITY_NORMAL: CommandPriority = 1;
pub const PRIORITY_HIGH: CommandPriority = 2;
pub const PRIORITY_CRITICAL: CommandPriority = 3;

/// What a listener returns; `Handled` short-circuits remaining,
/// lower-priority listeners (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerResult {
    Handled,
    Ignored,
}

pub type CommandListener = Arc<dyn Fn(&mut Editor, &CommandPayload) -> ListenerResult + Send + Sync>;

struct Registration {
    id: u64,
    priority: CommandPriority,
    listener: CommandListener,
}

/// Removal handle returned by `register_command`; dropping it does
/// nothing — call `remove()` explicitly, mirroring the teacher's
/// explicit-unregister handles rather than RAII guards, since commands
/// are typically registered for an editor's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle {
    pub(crate) command: &'static str,
    pub(crate) id: u64,
}

#[derive(Default)]
pub struct CommandRegistry {
    next_id: AtomicU64,
    by_command: std::collections::HashMap<&'static str, Vec<Registration>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(1), by_command: std::collections::HashMap::new() }
    }

    pub fn register(&mut self, command: CommandType, priority: CommandPriority, listener: CommandListener) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entries = self.by_command.entry(command.0).or_default();
        entries.push(Registration { id, priority, listener });
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));
        ListenerHandle { command: command.0, id }
    }

    pub fn remove(&mut self, handle: ListenerHandle) {
        if let Some(entries) = self.by_command.get_mut(handle.command) {
            entries.retain(|r| r.id != handle.id);
        }
    }

    /// Snapshots registered listeners for `command` in descending
    /// priority order. Returns owned `Arc` clones (cheap) rather than
    /// borrowing, so the caller (`Editor::dispatch_command`) can drop the
    /// borrow on the registry before handing out `&mut Editor` — a
    /// listener may itself call back into `self.command_registry`.
    pub fn snapshot_listeners(&self, command: &CommandType) -> Vec<CommandListener> {
        self.by_command.get(command.0).into_iter().flatten().map(|r| r.listener.clone()).collect()
    }
}
