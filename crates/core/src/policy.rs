//! Spawn policies - bomb substitution, bomb spawning and fill selection
//!
//! Pure functions over the board and an RNG. The resolver decides when to
//! call them; nothing here mutates the grid.

use crate::board::Board;
use crate::rng::GemRng;
use crate::types::{GemKind, Pos, BOMB_SPAWN_THRESHOLD};

/// Outcome of choosing a kind for an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillChoice {
    pub kind: GemKind,
    /// The iteration cap ran out and `kind` completes a run
    pub forced: bool,
}

/// Pick a kind for (x, y), rerolling while it would complete a run.
///
/// After `max_iterations` rerolls the last candidate is accepted even if it
/// matches. `kinds` must not be empty.
pub fn choose_fill_kind(
    board: &Board,
    pos: Pos,
    kinds: &[GemKind],
    max_iterations: u32,
    rng: &mut GemRng,
) -> FillChoice {
    let mut kind = kinds[rng.next_range(kinds.len())];
    let mut iterations = 0;
    while board.would_match(pos.x, pos.y, kind) && iterations < max_iterations {
        kind = kinds[rng.next_range(kinds.len())];
        iterations += 1;
    }
    FillChoice {
        kind,
        forced: board.would_match(pos.x, pos.y, kind),
    }
}

/// Replace `kind` with a bomb with probability `chance_percent`.
///
/// A kind that already is a bomb is returned unchanged without consuming
/// randomness.
pub fn substitute_bomb(kind: GemKind, chance_percent: f32, rng: &mut GemRng) -> GemKind {
    if kind.is_bomb() {
        return kind;
    }
    if rng.chance(chance_percent) {
        GemKind::Bomb
    } else {
        kind
    }
}

/// A bomb spawns when more than three ordinary gems matched and all of them
/// share one kind.
pub fn should_spawn_bomb(kinds: &[GemKind]) -> bool {
    let Some(first) = kinds.first() else {
        return false;
    };
    kinds.len() > BOMB_SPAWN_THRESHOLD && kinds.iter().all(|k| k == first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bomb_spawn_needs_four_of_a_kind() {
        assert!(!should_spawn_bomb(&[]));
        assert!(!should_spawn_bomb(&[GemKind::Red; 3]));
        assert!(should_spawn_bomb(&[GemKind::Red; 4]));
        assert!(should_spawn_bomb(&[GemKind::Blue; 6]));
    }

    #[test]
    fn bomb_spawn_rejects_mixed_kinds() {
        let mixed = [
            GemKind::Red,
            GemKind::Red,
            GemKind::Red,
            GemKind::Green,
            GemKind::Green,
        ];
        assert!(!should_spawn_bomb(&mixed));
    }

    #[test]
    fn substitution_respects_chance() {
        let mut rng = GemRng::new(5);
        assert_eq!(substitute_bomb(GemKind::Red, 0.0, &mut rng), GemKind::Red);
        assert_eq!(substitute_bomb(GemKind::Red, 100.0, &mut rng), GemKind::Bomb);
        assert_eq!(substitute_bomb(GemKind::Bomb, 0.0, &mut rng), GemKind::Bomb);
    }

    #[test]
    fn fill_avoids_runs_when_possible() {
        let board = Board::from_rows(&["...", "rr."]);
        let mut rng = GemRng::new(11);
        for _ in 0..200 {
            let choice = choose_fill_kind(
                &board,
                Pos::new(2, 0),
                &[GemKind::Red, GemKind::Blue],
                100,
                &mut rng,
            );
            assert_eq!(choice.kind, GemKind::Blue);
            assert!(!choice.forced);
        }
    }

    #[test]
    fn fill_is_forced_when_every_kind_matches() {
        let board = Board::from_rows(&["...", "rr."]);
        let mut rng = GemRng::new(11);
        let choice = choose_fill_kind(&board, Pos::new(2, 0), &[GemKind::Red], 10, &mut rng);
        assert_eq!(choice.kind, GemKind::Red);
        assert!(choice.forced);
    }
}
