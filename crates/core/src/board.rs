//! Board module - manages the gem grid
//!
//! The board is a W x H grid where each slot is empty or holds a handle to a
//! gem in the board's [`GemPool`]. Slots live in a flat row-major vector.
//! Coordinates: (x, y) where x ranges 0..W (left to right) and y ranges 0..H
//! (bottom to top). Gravity pulls toward y = 0.
//!
//! The grid is the only authority on placement: a gem's stored position is
//! rewritten every time it is written into a slot.

use crate::error::BoardError;
use crate::pool::{Gem, GemId, GemPool};
use crate::types::{GemKind, Pos, BOMB_SCORE, GEM_SCORE};

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    width: u8,
    height: u8,
    /// Flat array of slots, row-major order (y * width + x)
    cells: Vec<Option<GemId>>,
    pool: GemPool,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Dimensions are clamped to `1..=127` so every coordinate fits an `i8`.
    pub fn new(width: u8, height: u8) -> Self {
        let width = width.clamp(1, i8::MAX as u8);
        let height = height.clamp(1, i8::MAX as u8);
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![None; size],
            pool: GemPool::with_capacity(size),
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    pub(crate) fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x as u8 >= self.width || y < 0 || y as u8 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn checked_index(&self, x: i8, y: i8) -> Result<usize, BoardError> {
        self.index(x, y).ok_or(BoardError::OutOfRange {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.index(pos.x, pos.y).is_some()
    }

    /// Current occupant of (x, y)
    pub fn get(&self, x: i8, y: i8) -> Result<Option<GemId>, BoardError> {
        self.checked_index(x, y).map(|idx| self.cells[idx])
    }

    /// Overwrite slot (x, y).
    ///
    /// No match checking happens here. Placing a gem moves its stored
    /// position to (x, y); whatever occupied the slot before is only
    /// unreferenced, not despawned.
    pub fn set(&mut self, x: i8, y: i8, cell: Option<GemId>) -> Result<(), BoardError> {
        let idx = self.checked_index(x, y)?;
        if let Some(id) = cell {
            let gem = self.pool.get_mut(id).ok_or(BoardError::StaleGem(id))?;
            gem.pos = Pos::new(x, y);
        }
        self.cells[idx] = cell;
        Ok(())
    }

    /// Look up a live gem
    pub fn gem(&self, id: GemId) -> Option<&Gem> {
        self.pool.get(id)
    }

    /// Kind of the gem at (x, y), `None` when empty or out of range
    pub fn kind_at(&self, x: i8, y: i8) -> Option<GemKind> {
        self.index(x, y)
            .and_then(|idx| self.cells[idx])
            .and_then(|id| self.pool.get(id))
            .map(|gem| gem.kind)
    }

    /// Allocate a gem without placing it
    pub fn spawn(&mut self, kind: GemKind, score_value: u32) -> GemId {
        self.pool.insert(Gem {
            kind,
            pos: Pos::new(-1, -1),
            score_value,
        })
    }

    /// Allocate a gem and write it into `pos`
    pub fn place(&mut self, pos: Pos, kind: GemKind, score_value: u32) -> Result<GemId, BoardError> {
        self.checked_index(pos.x, pos.y)?;
        let id = self.spawn(kind, score_value);
        self.set(pos.x, pos.y, Some(id))?;
        Ok(id)
    }

    /// Release a gem back to the pool.
    ///
    /// The slot at the gem's position is cleared only if it still holds this
    /// gem; a newer occupant of the same slot is left alone.
    pub fn despawn(&mut self, id: GemId) -> Option<Gem> {
        let gem = self.pool.remove(id)?;
        if let Some(idx) = self.index(gem.pos.x, gem.pos.y) {
            if self.cells[idx] == Some(id) {
                self.cells[idx] = None;
            }
        }
        Some(gem)
    }

    /// Exchange the occupants of two slots
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<(), BoardError> {
        let ia = self.checked_index(a.x, a.y)?;
        let ib = self.checked_index(b.x, b.y)?;
        self.cells.swap(ia, ib);
        for (idx, pos) in [(ia, a), (ib, b)] {
            if let Some(gem) = self.cells[idx].and_then(|id| self.pool.get_mut(id)) {
                gem.pos = pos;
            }
        }
        Ok(())
    }

    /// Gravity compaction.
    ///
    /// Each column is scanned bottom to top while counting empty slots; every
    /// gem found after `n` empties drops by `n` rows. Survivors keep their
    /// relative order and all gaps end up at the top. Returns how many gems
    /// moved.
    pub fn compact_columns(&mut self) -> usize {
        let mut moved = 0;
        for x in 0..self.width as i8 {
            let mut empties: i8 = 0;
            for y in 0..self.height as i8 {
                let idx = y as usize * self.width as usize + x as usize;
                let Some(id) = self.cells[idx] else {
                    empties += 1;
                    continue;
                };
                let Some(gem) = self.pool.get_mut(id) else {
                    // Dangling handle: drop it and treat the slot as empty.
                    self.cells[idx] = None;
                    empties += 1;
                    continue;
                };
                if empties > 0 {
                    let target = (y - empties) as usize * self.width as usize + x as usize;
                    gem.pos.y -= empties;
                    self.cells[target] = Some(id);
                    self.cells[idx] = None;
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Empty slots in fill order: column by column, bottom to top
    pub fn empty_cells(&self) -> Vec<Pos> {
        let mut out = Vec::new();
        for x in 0..self.width as i8 {
            for y in 0..self.height as i8 {
                if self.cells[y as usize * self.width as usize + x as usize].is_none() {
                    out.push(Pos::new(x, y));
                }
            }
        }
        out
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }

    /// Live gems that no slot references
    pub fn orphans(&self) -> Vec<GemId> {
        self.pool
            .iter()
            .filter(|(id, gem)| {
                self.index(gem.pos.x, gem.pos.y)
                    .map_or(true, |idx| self.cells[idx] != Some(*id))
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of live gems, placed or not
    pub fn live_gems(&self) -> usize {
        self.pool.len()
    }

    /// Get a reference to the internal slot array
    pub fn cells(&self) -> &[Option<GemId>] {
        &self.cells
    }

    /// Empty the grid and release every gem
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.pool.clear();
    }

    /// Build a board from character rows, listed top row first.
    ///
    /// Characters follow [`GemKind::code`]; anything else (conventionally
    /// `.`) is an empty slot. Gems get the default score values. Handy for
    /// fixtures and tests.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len().min(i8::MAX as usize) as u8;
        let width = rows
            .iter()
            .map(|r| r.chars().count())
            .max()
            .unwrap_or(0)
            .min(i8::MAX as usize) as u8;
        let mut board = Board::new(width, height);

        for (row, line) in rows.iter().enumerate().take(board.height as usize) {
            let y = (board.height as usize - 1 - row) as i8;
            for (x, c) in line.chars().enumerate().take(board.width as usize) {
                let Some(kind) = GemKind::from_code(c) else {
                    continue;
                };
                let score = if kind.is_bomb() { BOMB_SCORE } else { GEM_SCORE };
                let _ = board.place(Pos::new(x as i8, y), kind, score);
            }
        }
        board
    }

    /// Character rows, top row first (inverse of [`Board::from_rows`])
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height as i8)
            .rev()
            .map(|y| {
                (0..self.width as i8)
                    .map(|x| self.kind_at(x, y).map_or('.', |k| k.code()))
                    .collect()
            })
            .collect()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.to_rows() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        let board = Board::new(7, 5);
        assert_eq!(board.index(0, 0), Some(0));
        assert_eq!(board.index(6, 0), Some(6));
        assert_eq!(board.index(0, 1), Some(7));
        assert_eq!(board.index(6, 4), Some(34));
        assert_eq!(board.index(-1, 0), None);
        assert_eq!(board.index(7, 0), None);
        assert_eq!(board.index(0, 5), None);
    }

    #[test]
    fn test_set_syncs_position() {
        let mut board = Board::new(4, 4);
        let id = board.spawn(GemKind::Red, 10);
        board.set(2, 3, Some(id)).unwrap();
        assert_eq!(board.gem(id).unwrap().pos, Pos::new(2, 3));

        board.set(1, 0, Some(id)).unwrap();
        board.set(2, 3, None).unwrap();
        assert_eq!(board.gem(id).unwrap().pos, Pos::new(1, 0));
        assert_eq!(board.get(1, 0), Ok(Some(id)));
    }

    #[test]
    fn test_set_rejects_stale_handle() {
        let mut board = Board::new(3, 3);
        let id = board.place(Pos::new(0, 0), GemKind::Blue, 10).unwrap();
        board.despawn(id);
        assert_eq!(board.set(1, 1, Some(id)), Err(BoardError::StaleGem(id)));
        assert_eq!(board.get(1, 1), Ok(None));
    }

    #[test]
    fn test_despawn_keeps_newer_occupant() {
        let mut board = Board::new(3, 3);
        let old = board.place(Pos::new(1, 1), GemKind::Red, 10).unwrap();
        let new = board.place(Pos::new(1, 1), GemKind::Bomb, 50).unwrap();

        assert!(board.despawn(old).is_some());
        assert_eq!(board.get(1, 1), Ok(Some(new)));
    }

    #[test]
    fn test_orphans_after_overwrite() {
        let mut board = Board::new(3, 3);
        let old = board.place(Pos::new(0, 0), GemKind::Red, 10).unwrap();
        board.place(Pos::new(0, 0), GemKind::Green, 10).unwrap();
        let loose = board.spawn(GemKind::Blue, 10);

        let orphans = board.orphans();
        assert_eq!(orphans.len(), 2);
        assert!(orphans.contains(&old));
        assert!(orphans.contains(&loose));
    }

    #[test]
    fn test_rows_roundtrip() {
        let rows = ["rg.", "b*y", "p.r"];
        let board = Board::from_rows(&rows);
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 3);
        assert_eq!(board.kind_at(0, 0), Some(GemKind::Purple));
        assert_eq!(board.kind_at(1, 1), Some(GemKind::Bomb));
        assert_eq!(board.kind_at(2, 2), None);
        assert_eq!(board.to_rows(), rows);
        assert!(board.orphans().is_empty());
    }
}
