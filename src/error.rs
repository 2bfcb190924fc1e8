//! Error taxonomy (spec §7).
//!
//! Every mutation API returns a `Result`; nothing in this crate panics
//! outside of test code and documented invariant-violation assertions
//! that are themselves surfaced as `ReconcilerInvariantViolation`.

use crate::key::NodeKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("write attempted inside a read-only block")]
    ReadOnlyViolation,

    #[error("mutation API called outside of editor.update")]
    NoActiveEditor,

    #[error("node {0} has no parent or its parent is missing from the node map")]
    ParentMissing(NodeKey),

    #[error("operation on {0} would make an ancestor a descendant of itself")]
    CycleDetected(NodeKey),

    #[error("no node registered under key {0}")]
    KeyNotFound(NodeKey),

    #[error("point ({key}, {offset}) is out of range for its node")]
    PointOutOfRange { key: NodeKey, offset: u32 },

    #[error("selection is invalid: {0}")]
    InvalidSelection(String),

    #[error("reconciler invariant violated: {0}")]
    ReconcilerInvariantViolation(String),

    #[error("delta application failed: {reason}")]
    DeltaApplicationFailure { reason: String },

    #[error("serialization error: {detail}")]
    SerializationError { detail: String },
}

pub type EditorResult<T> = Result<T, EditorError>;
