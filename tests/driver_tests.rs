//! Driver tests - swaps and snapshots over the command channel

use gem_cascade::core::Board;
use gem_cascade::engine::{
    Driver, EngineConfig, Resolver, SwapOutcome, SwapRejection, Timings,
};
use gem_cascade::types::{GamePhase, Pos, GEM_SCORE};

const ROWS: [&str; 3] = [
    "gbyg", //
    "bygb", //
    "rrgr",
];

fn resolver() -> Resolver {
    let config = EngineConfig {
        bomb_chance: 0.0,
        seed: Some(21),
        timings: Timings::default(),
        ..EngineConfig::default()
    };
    Resolver::with_board(config, Board::from_rows(&ROWS)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn swap_without_match_is_reverted() {
    let (driver, handle) = Driver::new(resolver(), 4);
    let task = tokio::spawn(driver.run());

    let outcome = handle.swap(Pos::new(0, 2), Pos::new(1, 2)).await.unwrap();
    assert_eq!(outcome, SwapOutcome::NoMatch);

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.board.rows(), ROWS);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.phase, GamePhase::Move);

    handle.shutdown().await.unwrap();
    let resolver = task.await.unwrap();
    assert_eq!(resolver.score(), 0);
}

#[tokio::test(start_paused = true)]
async fn matching_swap_resolves_before_reply() {
    let (driver, handle) = Driver::new(resolver(), 4);
    let mut phases = handle.phase_updates();
    let mut scores = handle.score_updates();
    let task = tokio::spawn(driver.run());

    let outcome = handle.swap(Pos::new(2, 0), Pos::new(3, 0)).await.unwrap();
    let SwapOutcome::Resolved(report) = outcome else {
        panic!("expected the swap to resolve, got {:?}", outcome);
    };
    assert_eq!(report.steps[0].matched, 3);
    assert_eq!(report.steps[0].points, 3 * GEM_SCORE);

    // The reply only arrives once the cycle is over
    assert_eq!(handle.phase(), GamePhase::Move);
    assert!(phases.has_changed().unwrap());
    assert_eq!(handle.score(), report.points());
    assert!(scores.has_changed().unwrap());
    assert_eq!(*scores.borrow_and_update(), report.points());

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.score, report.points());
    assert_eq!(snap.board.occupied(), 12);

    handle.shutdown().await.unwrap();
    let resolver = task.await.unwrap();
    assert!(resolver.board().find_all_matches().is_empty());
    assert!(resolver.board().orphans().is_empty());
}

#[tokio::test(start_paused = true)]
async fn invalid_swaps_are_rejected() {
    let (driver, handle) = Driver::new(resolver(), 4);
    let task = tokio::spawn(driver.run());

    let cases = [
        (Pos::new(0, 0), Pos::new(2, 0), SwapRejection::NotAdjacent),
        (Pos::new(0, 0), Pos::new(0, 0), SwapRejection::NotAdjacent),
        (Pos::new(3, 0), Pos::new(4, 0), SwapRejection::OutOfRange),
        (Pos::new(0, -1), Pos::new(0, 0), SwapRejection::OutOfRange),
    ];
    for (from, to, why) in cases {
        let outcome = handle.swap(from, to).await.unwrap();
        assert_eq!(outcome, SwapOutcome::Rejected(why), "{} <-> {}", from, to);
    }

    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.board.rows(), ROWS);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn swap_refused_while_phase_is_locked() {
    let mut locked = resolver();
    locked.set_state(GamePhase::Wait);
    let (driver, handle) = Driver::new(locked, 4);
    let task = tokio::spawn(driver.run());

    let outcome = handle.swap(Pos::new(2, 0), Pos::new(3, 0)).await.unwrap();
    assert_eq!(
        outcome,
        SwapOutcome::Rejected(SwapRejection::Locked(GamePhase::Wait))
    );

    handle.shutdown().await.unwrap();
    let resolver = task.await.unwrap();
    assert_eq!(resolver.board().to_rows(), ROWS);
}

#[tokio::test(start_paused = true)]
async fn loop_stops_when_handles_are_dropped() {
    let (driver, handle) = Driver::new(resolver(), 1);
    let task = tokio::spawn(driver.run());

    let other = handle.clone();
    drop(handle);
    assert!(other.snapshot().await.is_ok());
    drop(other);

    let resolver = task.await.unwrap();
    assert_eq!(resolver.current_state(), GamePhase::Move);
}

#[tokio::test(start_paused = true)]
async fn commands_fail_after_shutdown() {
    let (driver, handle) = Driver::new(resolver(), 4);
    let task = tokio::spawn(driver.run());

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert!(handle.snapshot().await.is_err());
    assert!(handle.swap(Pos::new(0, 0), Pos::new(1, 0)).await.is_err());
}
