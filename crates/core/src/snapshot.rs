//! Plain-data view of the grid for observers
//!
//! A snapshot holds kinds only (no handles), so it can outlive the board and
//! be compared across cycles. The FNV-1a hash is stable across platforms.

use crate::board::Board;
use crate::types::GemKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major, `y = 0` first
    pub cells: Vec<Option<GemKind>>,
    pub board_hash: u64,
}

fn fnv1a64(bytes: impl Iterator<Item = u8>) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(0x00000100000001B3);
    }
    h
}

impl BoardSnapshot {
    pub fn kind_at(&self, x: i8, y: i8) -> Option<GemKind> {
        if x < 0 || x as u8 >= self.width || y < 0 || y as u8 >= self.height {
            return None;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Character rows, top row first
    pub fn rows(&self) -> Vec<String> {
        (0..self.height as i8)
            .rev()
            .map(|y| {
                (0..self.width as i8)
                    .map(|x| self.kind_at(x, y).map_or('.', |k| k.code()))
                    .collect()
            })
            .collect()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn count(&self, kind: GemKind) -> usize {
        self.cells.iter().filter(|c| **c == Some(kind)).count()
    }
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        let cells: Vec<Option<GemKind>> = (0..self.height() as i8)
            .flat_map(|y| (0..self.width() as i8).map(move |x| (x, y)))
            .map(|(x, y)| self.kind_at(x, y))
            .collect();
        let board_hash = fnv1a64(cells.iter().map(|c| c.map_or(0, |k| k.code() as u8)));
        BoardSnapshot {
            width: self.width(),
            height: self.height(),
            cells,
            board_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pos;

    #[test]
    fn snapshot_matches_board() {
        let board = Board::from_rows(&["r.g", "b*y"]);
        let snap = board.snapshot();
        assert_eq!(snap.rows(), board.to_rows());
        assert_eq!(snap.kind_at(1, 0), Some(GemKind::Bomb));
        assert_eq!(snap.occupied(), 5);
        assert_eq!(snap.count(GemKind::Bomb), 1);
    }

    #[test]
    fn hash_tracks_contents() {
        let mut board = Board::from_rows(&["rgb", "gbr"]);
        let before = board.snapshot().board_hash;
        assert_eq!(before, board.snapshot().board_hash);

        board.swap(Pos::new(0, 0), Pos::new(1, 0)).unwrap();
        assert_ne!(before, board.snapshot().board_hash);
    }
}
