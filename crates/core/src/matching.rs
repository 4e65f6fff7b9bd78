//! Match detection
//!
//! Two entry points:
//!
//! - [`Board::would_match`]: the cheap spawn-time predicate. It only looks
//!   west and south because cells are filled column by column, bottom up,
//!   so those are the only neighbours that already exist.
//! - [`Board::find_all_matches`]: the full scan. Symmetric in all four
//!   directions, deterministic, read-only.
//!
//! Runs of three or more equal kinds are found per row and per column, then
//! runs sharing a cell are merged with a union-find so that L, T and +
//! shapes come out as a single [`MatchGroup`].

use crate::board::Board;
use crate::pool::GemId;
use crate::types::{GemKind, Pos, MIN_MATCH};

/// One combined match: every run of `kind` that shares a cell with another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub kind: GemKind,
    /// Members in scan order (column by column, bottom to top)
    pub gems: Vec<GemId>,
}

/// Result of one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    /// Gems in ordinary (non-bomb) runs
    pub matches: Vec<GemId>,
    /// Gems in the row or column of a matched bomb that are not already in
    /// `matches`
    pub bomb_matches: Vec<GemId>,
    pub groups: Vec<MatchGroup>,
    /// Slots holding a handle whose gem was last written elsewhere. They
    /// still count towards runs but are never listed as a match.
    pub stray: Vec<(GemId, Pos)>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.bomb_matches.is_empty()
    }

    /// Total number of gems to destroy
    pub fn len(&self) -> usize {
        self.matches.len() + self.bomb_matches.len()
    }

    pub fn contains(&self, id: GemId) -> bool {
        self.matches.contains(&id) || self.bomb_matches.contains(&id)
    }

    /// Ordinary matches first, then bomb matches
    pub fn iter(&self) -> impl Iterator<Item = GemId> + '_ {
        self.matches.iter().chain(self.bomb_matches.iter()).copied()
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[rb.max(ra)] = ra.min(rb);
    }
}

impl Board {
    /// Would placing `kind` at (x, y) complete a run with already-placed
    /// neighbours? Checks the two cells to the west and the two to the south.
    pub fn would_match(&self, x: i8, y: i8, kind: GemKind) -> bool {
        let west = x >= 2
            && self.kind_at(x - 1, y) == Some(kind)
            && self.kind_at(x - 2, y) == Some(kind);
        let south = y >= 2
            && self.kind_at(x, y - 1) == Some(kind)
            && self.kind_at(x, y - 2) == Some(kind);
        west || south
    }

    /// Scan the whole grid for matches.
    ///
    /// Ordinary runs fill `matches`. A run of bombs blasts the full row and
    /// column of each bomb in it; every gem hit that is not already an
    /// ordinary match goes to `bomb_matches`. No gem appears twice: a handle
    /// sitting in more than one slot is listed from its own slot only, the
    /// other matched slots go to `stray`.
    pub fn find_all_matches(&self) -> MatchSet {
        let w = self.width() as usize;
        let h = self.height() as usize;
        let n = w * h;

        let kinds: Vec<Option<GemKind>> = self
            .cells()
            .iter()
            .map(|cell| cell.and_then(|id| self.gem(id)).map(|g| g.kind))
            .collect();

        let mut parent: Vec<usize> = (0..n).collect();
        let mut matched = vec![false; n];

        let rows = (0..h).map(|y| (0..w).map(|x| y * w + x).collect::<Vec<_>>());
        let cols = (0..w).map(|x| (0..h).map(|y| y * w + x).collect::<Vec<_>>());

        for line in rows.chain(cols) {
            let mut start = 0;
            while start < line.len() {
                let Some(kind) = kinds[line[start]] else {
                    start += 1;
                    continue;
                };
                let mut end = start + 1;
                while end < line.len() && kinds[line[end]] == Some(kind) {
                    end += 1;
                }
                if end - start >= MIN_MATCH {
                    for &idx in &line[start..end] {
                        matched[idx] = true;
                        union(&mut parent, line[start], idx);
                    }
                }
                start = end;
            }
        }

        let mut blasted = vec![false; n];
        for idx in (0..n).filter(|&i| matched[i] && kinds[i].is_some_and(|k| k.is_bomb())) {
            let (bx, by) = (idx % w, idx / w);
            (0..w).for_each(|x| blasted[by * w + x] = true);
            (0..h).for_each(|y| blasted[y * w + bx] = true);
        }

        let mut set = MatchSet::default();
        let mut group_of_root: Vec<Option<usize>> = vec![None; n];

        for x in 0..w {
            for y in 0..h {
                let idx = y * w + x;
                let (Some(id), Some(kind)) = (self.cells()[idx], kinds[idx]) else {
                    continue;
                };
                let here = Pos::new(x as i8, y as i8);
                if self.gem(id).is_some_and(|gem| gem.pos != here) {
                    if matched[idx] || blasted[idx] {
                        set.stray.push((id, here));
                    }
                    continue;
                }

                if matched[idx] {
                    let root = find(&mut parent, idx);
                    let group = *group_of_root[root].get_or_insert_with(|| {
                        set.groups.push(MatchGroup {
                            kind,
                            gems: Vec::new(),
                        });
                        set.groups.len() - 1
                    });
                    set.groups[group].gems.push(id);
                }

                if matched[idx] && !kind.is_bomb() {
                    set.matches.push(id);
                } else if blasted[idx] {
                    set.bomb_matches.push(id);
                }
            }
        }

        set
    }
}
