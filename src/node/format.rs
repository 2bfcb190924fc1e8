//! Format and detail bitsets, element direction, list markers.
//!
//! Grounded on the small enum-per-concern style of `input.rs`'s
//! `InputAction`/`Selection` fields; generalized into `bitflags` sets
//! since spec §3.1 explicitly calls these out as bitsets.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Character-level formatting on a Text node (spec §3.1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TextFormat: u16 {
        const BOLD          = 1 << 0;
        const ITALIC        = 1 << 1;
        const UNDERLINE     = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const CODE          = 1 << 4;
        const SUBSCRIPT     = 1 << 5;
        const SUPERSCRIPT   = 1 << 6;
    }
}

bitflags! {
    /// Opaque per-character detail flags (spec §3.1); the core never
    /// interprets these beyond carrying them through normalization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TextDetail: u8 {
        const DIRECTIONLESS = 1 << 0;
        const UNMERGEABLE   = 1 << 1;
    }
}

/// Text node edit mode (spec §3.1): `token` and `segmented` text cannot
/// be merged with neighbors during normalization (invariant 8) and are
/// edited atomically rather than character-by-character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextMode {
    #[default]
    Normal,
    Token,
    Segmented,
}

impl TextMode {
    pub fn is_mergeable(self) -> bool {
        matches!(self, TextMode::Normal)
    }
}

/// Block-level alignment/format flags carried by Element nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementFormatType {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ltr,
    Rtl,
}
