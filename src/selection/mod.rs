//! Selection model and point mapping (spec §3.2, §4.3, §4.6).
//!
//! Grounded on `input.rs`'s `Selection { cursor, anchor, id }` and its
//! `byte_range` method for the cursor/anchor shape, generalized from a
//! byte-offset-in-flat-rope model to `(key, offset, kind)` points mapped
//! through the Fenwick-indexed range cache rather than a single rope.

mod mapping;
mod modify;

pub use mapping::{point_at_string_location, string_location_for_point};
pub use modify::{delete_character, insert_text, move_character};

use crate::key::NodeKey;
use crate::node::format::TextFormat;
use std::collections::BTreeSet;

/// Which half of a `Point` the offset is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// `offset` is a UTF-16 code-unit index into a Text node's payload.
    Text,
    /// `offset` is a child index in `[0, childCount]` of an Element.
    Element,
}

/// Direction bias used to disambiguate an absolute location that sits on
/// a preamble/postamble boundary between two leaves (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

/// A `(nodeKey, offset, kind)` coordinate in the tree (spec §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub key: NodeKey,
    pub offset: u32,
    pub kind: PointKind,
}

impl Point {
    pub fn text(key: NodeKey, offset: u32) -> Self {
        Self { key, offset, kind: PointKind::Text }
    }

    pub fn element(key: NodeKey, offset: u32) -> Self {
        Self { key, offset, kind: PointKind::Element }
    }

    /// Ordering within the same node only; ordering across nodes
    /// requires the tree's pre-order position and is done via absolute
    /// locations (`string_location_for_point`), not local comparison.
    pub fn offset_before(&self, other: &Point) -> bool {
        self.key == other.key && self.offset < other.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Character,
    Word,
    Line,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyMode {
    /// Move both anchor and focus together (collapses the selection).
    Move,
    /// Move only the focus, extending or shrinking the range.
    Extend,
}

/// A caret or range selection anchored between two `Point`s (spec §3.2).
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSelection {
    pub anchor: Point,
    pub focus: Point,
    /// Format that will be applied to text inserted at a collapsed
    /// caret (spec §4.6 `insertText`), independent of any node's own
    /// format until text is actually written.
    pub format: TextFormat,
    pub style: String,
}

impl RangeSelection {
    pub fn collapsed(at: Point) -> Self {
        Self { anchor: at, focus: at, format: TextFormat::empty(), style: String::new() }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// A set of whole nodes selected as a unit (spec §3.2), e.g. a selected
/// Decorator or a multi-block selection made via shift-click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelection {
    pub nodes: BTreeSet<NodeKey>,
}

/// A rectangular cell range within a table/grid-like structure (spec
/// §3.2). The core carries this coordinate but has no grid node kind of
/// its own — grids are a plugin concern layered on Element/Generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSelection {
    pub grid_key: NodeKey,
    pub anchor_cell_key: NodeKey,
    pub focus_cell_key: NodeKey,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseSelection {
    Range(RangeSelection),
    Node(NodeSelection),
    Grid(GridSelection),
}

impl BaseSelection {
    pub fn as_range(&self) -> Option<&RangeSelection> {
        match self {
            BaseSelection::Range(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_range_mut(&mut self) -> Option<&mut RangeSelection> {
        match self {
            BaseSelection::Range(r) => Some(r),
            _ => None,
        }
    }
}
