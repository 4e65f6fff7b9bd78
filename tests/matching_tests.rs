//! Match detection and scoring over whole boards

use std::collections::HashSet;

use gem_cascade::core::{score_matches, Board, GemId};
use gem_cascade::types::{GemKind, BOMB_SCORE, GEM_SCORE};

fn assert_no_duplicates(ids: impl Iterator<Item = GemId>) {
    let mut seen = HashSet::new();
    for id in ids {
        assert!(seen.insert(id), "gem {} listed twice", id);
    }
}

#[test]
fn l_shape_is_one_combined_match() {
    let board = Board::from_rows(&[
        "r....", //
        "r....", //
        "rrr..",
    ]);
    let set = board.find_all_matches();
    assert_eq!(set.groups.len(), 1);
    assert_eq!(set.groups[0].kind, GemKind::Red);
    assert_eq!(set.groups[0].gems.len(), 5);
    assert_eq!(set.matches.len(), 5);
    assert!(set.bomb_matches.is_empty());
}

#[test]
fn plus_shape_counts_centre_once() {
    let board = Board::from_rows(&[
        ".g.", //
        "ggg", //
        ".g.",
    ]);
    let set = board.find_all_matches();
    assert_eq!(set.matches.len(), 5);
    assert_eq!(set.groups.len(), 1);
    assert_no_duplicates(set.iter());
}

#[test]
fn two_kinds_stay_in_separate_groups() {
    let board = Board::from_rows(&[
        "yyyb", //
        "bgrb", //
        "grgb",
    ]);
    let set = board.find_all_matches();
    assert_eq!(set.matches.len(), 6);
    let kinds: HashSet<GemKind> = set.groups.iter().map(|g| g.kind).collect();
    assert_eq!(kinds, HashSet::from([GemKind::Yellow, GemKind::Blue]));
}

#[test]
fn bomb_blast_never_double_counts() {
    // Red column on the left, bomb run along the bottom row
    let board = Board::from_rows(&[
        "rgby", //
        "rgyb", //
        "r***",
    ]);
    let set = board.find_all_matches();

    assert_eq!(set.matches.len(), 3);
    assert!(set
        .matches
        .iter()
        .all(|id| board.gem(*id).unwrap().kind == GemKind::Red));

    // Row 0 and columns 1..=3, minus the red gem already matched at (0, 0)
    assert_eq!(set.bomb_matches.len(), 9);
    assert_no_duplicates(set.iter());
    assert_eq!(set.len(), 12);

    let score = score_matches(&board, &set);
    assert_eq!(score.ordinary, 3 * GEM_SCORE);
    assert_eq!(score.bomb, 3 * BOMB_SCORE + 6 * GEM_SCORE);
    assert_eq!(score.total, score.ordinary + score.bomb);
    assert_eq!(score.stale, 0);
}

#[test]
fn vertical_bomb_run_blasts_rows() {
    let board = Board::from_rows(&[
        "g*b", //
        "y*g", //
        "b*y", //
        "gry",
    ]);
    let set = board.find_all_matches();
    assert!(set.matches.is_empty());
    // Column 1 plus rows 1..=3
    assert_eq!(set.bomb_matches.len(), 10);
    assert_eq!(board.kind_at(0, 0), Some(GemKind::Green));
    let untouched = [board.get(0, 0).unwrap().unwrap(), board.get(2, 0).unwrap().unwrap()];
    assert!(untouched.iter().all(|id| !set.contains(*id)));
}

#[test]
fn detection_is_deterministic_and_read_only() {
    let board = Board::from_rows(&[
        "rgbyp", //
        "rrrgb", //
        "ygbbb",
    ]);
    let before = board.snapshot();
    let first = board.find_all_matches();
    let second = board.find_all_matches();
    assert_eq!(first, second);
    assert_eq!(board.snapshot(), before);
}

#[test]
fn despawned_gems_are_stale_when_scored() {
    let mut board = Board::from_rows(&["gby", "rrr"]);
    let set = board.find_all_matches();
    let first = set.matches[0];
    board.despawn(first);

    let score = score_matches(&board, &set);
    assert_eq!(score.stale, 1);
    assert_eq!(score.total, 2 * GEM_SCORE);
}
