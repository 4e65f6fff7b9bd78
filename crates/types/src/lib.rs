//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behaviour beyond parsing and formatting,
//! making them usable in any context (board logic, resolver, configuration).
//!
//! # Board Dimensions
//!
//! - **Width**: 7 columns by default (indexed 0-6, left to right)
//! - **Height**: 7 rows by default (indexed 0-6, bottom to top)
//!
//! Row `y = 0` is the bottom of the board; gravity pulls gems toward it.
//!
//! # Pacing Constants
//!
//! Delays between resolution phases, in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `COMPACTION_DELAY_MS` | 1000 | Pause after destructions are issued, before gravity |
//! | `BOMB_DESTROY_DELAY_MS` | 1000 | Extra wait before a bomb-triggered removal |
//! | `REFILL_DELAY_MS` | 500 | Pause after gravity, before the first refill |
//! | `REFILL_STEP_MS` | 100 | Pause between two refilled cells |
//! | `REDETECT_DELAY_MS` | 500 | Pause between the end of refill and re-detection |
//! | `SETTLE_DELAY_MS` | 500 | Pause after re-detection, before the next phase |
//!
//! # Examples
//!
//! ```
//! use gem_cascade_types::{GemKind, GamePhase, Pos};
//!
//! let kind = GemKind::from_str("red").unwrap();
//! assert_eq!(kind, GemKind::Red);
//! assert!(!kind.is_bomb());
//!
//! assert!(GamePhase::Move.accepts_input());
//! assert!(!GamePhase::Wait.accepts_input());
//!
//! assert!(Pos::new(2, 3).is_adjacent(Pos::new(2, 4)));
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells (7 columns)
pub const BOARD_WIDTH: u8 = 7;

/// Default board height in cells (7 rows)
pub const BOARD_HEIGHT: u8 = 7;

/// Minimum run length that counts as a match
pub const MIN_MATCH: usize = 3;

/// Rejection-sampling cap when choosing a non-matching kind
pub const MAX_ITERATIONS: u32 = 100;

/// Default bomb substitution chance in percent
pub const BOMB_CHANCE_PERCENT: f32 = 2.0;

/// Ordinary-match size above which a same-kind match spawns a bomb
pub const BOMB_SPAWN_THRESHOLD: usize = 3;

/// Default score value of an ordinary gem
pub const GEM_SCORE: u32 = 10;

/// Default score value of a bomb
pub const BOMB_SCORE: u32 = 50;

/// Pause after destructions are issued, before compaction (1000ms)
pub const COMPACTION_DELAY_MS: u64 = 1000;

/// Extra wait before a bomb-triggered destruction (1000ms)
pub const BOMB_DESTROY_DELAY_MS: u64 = 1000;

/// Pause between compaction and refill (500ms)
pub const REFILL_DELAY_MS: u64 = 500;

/// Pause between two refilled cells (100ms)
pub const REFILL_STEP_MS: u64 = 100;

/// Pause between refill and re-detection (500ms)
pub const REDETECT_DELAY_MS: u64 = 500;

/// Pause after re-detection, before the next cascade or unlocking (500ms)
pub const SETTLE_DELAY_MS: u64 = 500;

/// Cascade backstop for a single resolution cycle
pub const MAX_CASCADES: u32 = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_defaults() {
        assert_eq!(COMPACTION_DELAY_MS, 1000);
        assert_eq!(BOMB_DESTROY_DELAY_MS, 1000);
        assert_eq!(REFILL_DELAY_MS, 500);
        assert_eq!(REFILL_STEP_MS, 100);
        assert_eq!(REDETECT_DELAY_MS, 500);
        assert_eq!(SETTLE_DELAY_MS, 500);
        assert_eq!(MAX_ITERATIONS, 100);
    }

    #[test]
    fn gem_kind_string_roundtrip() {
        for kind in GemKind::ORDINARY.iter().copied().chain([GemKind::Bomb]) {
            assert_eq!(GemKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(GemKind::from_str("BLUE"), Some(GemKind::Blue));
        assert_eq!(GemKind::from_str("orange"), None);
    }

    #[test]
    fn gem_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&GemKind::Purple).unwrap();
        assert_eq!(json, "\"purple\"");
        let kind: GemKind = serde_json::from_str("\"bomb\"").unwrap();
        assert_eq!(kind, GemKind::Bomb);
    }

    #[test]
    fn only_move_accepts_input() {
        assert!(GamePhase::Move.accepts_input());
        for phase in [GamePhase::Wait, GamePhase::Collapse, GamePhase::Refill] {
            assert!(!phase.accepts_input());
        }
    }

    #[test]
    fn pos_adjacency() {
        let p = Pos::new(3, 3);
        for n in p.neighbors() {
            assert!(p.is_adjacent(n));
        }
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Pos::new(4, 4)));
        assert!(!p.is_adjacent(Pos::new(5, 3)));
    }
}

/// Gem kinds
///
/// Five ordinary colours plus the special bomb. A bomb match clears the
/// whole row and column of each bomb in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GemKind {
    Blue,
    Green,
    Red,
    Yellow,
    Purple,
    Bomb,
}

impl GemKind {
    /// All ordinary (non-bomb) kinds, in declaration order
    pub const ORDINARY: [GemKind; 5] = [
        GemKind::Blue,
        GemKind::Green,
        GemKind::Red,
        GemKind::Yellow,
        GemKind::Purple,
    ];

    /// Parse gem kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use gem_cascade_types::GemKind;
    ///
    /// assert_eq!(GemKind::from_str("blue"), Some(GemKind::Blue));
    /// assert_eq!(GemKind::from_str("Bomb"), Some(GemKind::Bomb));
    /// assert_eq!(GemKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(GemKind::Blue),
            "green" => Some(GemKind::Green),
            "red" => Some(GemKind::Red),
            "yellow" => Some(GemKind::Yellow),
            "purple" => Some(GemKind::Purple),
            "bomb" => Some(GemKind::Bomb),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GemKind::Blue => "blue",
            GemKind::Green => "green",
            GemKind::Red => "red",
            GemKind::Yellow => "yellow",
            GemKind::Purple => "purple",
            GemKind::Bomb => "bomb",
        }
    }

    /// Single-character code used in board dumps
    pub fn code(&self) -> char {
        match self {
            GemKind::Blue => 'b',
            GemKind::Green => 'g',
            GemKind::Red => 'r',
            GemKind::Yellow => 'y',
            GemKind::Purple => 'p',
            GemKind::Bomb => '*',
        }
    }

    /// Inverse of [`GemKind::code`]
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'b' => Some(GemKind::Blue),
            'g' => Some(GemKind::Green),
            'r' => Some(GemKind::Red),
            'y' => Some(GemKind::Yellow),
            'p' => Some(GemKind::Purple),
            '*' => Some(GemKind::Bomb),
            _ => None,
        }
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self, GemKind::Bomb)
    }
}

/// Resolution phases
///
/// The cycle runs `Move -> Wait -> Collapse -> Refill` and then either loops
/// back to `Wait` (cascade) or returns to `Move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Board is stable; player swaps are accepted
    #[default]
    Move,
    /// Matches are being scored and destroyed
    Wait,
    /// Gravity compaction
    Collapse,
    /// Empty cells are being refilled
    Refill,
}

impl GamePhase {
    /// Whether external mutation (player swaps) may happen in this phase
    pub fn accepts_input(&self) -> bool {
        matches!(self, GamePhase::Move)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Move => "move",
            GamePhase::Wait => "wait",
            GamePhase::Collapse => "collapse",
            GamePhase::Refill => "refill",
        }
    }
}

/// Grid coordinate
///
/// Signed so that neighbour arithmetic can step off the board; the board
/// rejects anything outside `0..width` / `0..height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: i8,
    pub y: i8,
}

impl Pos {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Orthogonal neighbours: west, east, south, north
    pub fn neighbors(&self) -> [Pos; 4] {
        [
            Pos::new(self.x - 1, self.y),
            Pos::new(self.x + 1, self.y),
            Pos::new(self.x, self.y - 1),
            Pos::new(self.x, self.y + 1),
        ]
    }

    /// True when `other` shares an edge with this cell
    pub fn is_adjacent(&self, other: Pos) -> bool {
        let dx = (self.x as i16 - other.x as i16).abs();
        let dy = (self.y as i16 - other.y as i16).abs();
        dx + dy == 1
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
