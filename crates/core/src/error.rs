//! Error types for grid access and invariant reporting

use thiserror::Error;

use crate::pool::GemId;
use crate::types::Pos;

/// Errors returned by [`Board`](crate::Board) accessors.
///
/// Both variants are caller bugs; the board is left untouched when they are
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("position ({x}, {y}) is outside the {width}x{height} board")]
    OutOfRange { x: i8, y: i8, width: u8, height: u8 },

    #[error("gem handle {0} is not live")]
    StaleGem(GemId),
}

/// Broken board invariants found during a resolution cycle.
///
/// These are logged and healed in place (the offending handle is dropped),
/// never propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("gem {id} at {pos} is live but no slot references it")]
    Orphan { id: GemId, pos: Pos },

    #[error("match set references gem {0} which is no longer live")]
    StaleMatch(GemId),

    #[error("slot {pos} holds gem {id} which lives in another slot")]
    StraySlot { id: GemId, pos: Pos },
}
