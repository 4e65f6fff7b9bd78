//! Scoring module - points for a detection pass
//!
//! Every destroyed gem is worth its own `score_value`. Ordinary and bomb
//! matches are summed separately so callers can report them; a gem never
//! counts twice because [`MatchSet`] never lists it twice.

use crate::board::Board;
use crate::matching::MatchSet;

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    /// Points from ordinary runs
    pub ordinary: u32,
    /// Points from gems caught in a bomb blast
    pub bomb: u32,
    pub total: u32,
    /// Handles in the set that no longer resolve (skipped)
    pub stale: usize,
}

/// Sum the score values of every gem in `set`
pub fn score_matches(board: &Board, set: &MatchSet) -> MatchScore {
    let mut stale = 0;
    let mut sum = |ids: &[crate::pool::GemId]| {
        ids.iter().fold(0u32, |acc, id| match board.gem(*id) {
            Some(gem) => acc.saturating_add(gem.score_value),
            None => {
                stale += 1;
                acc
            }
        })
    };

    let ordinary = sum(&set.matches);
    let bomb = sum(&set.bomb_matches);
    MatchScore {
        ordinary,
        bomb,
        total: ordinary.saturating_add(bomb),
        stale,
    }
}
