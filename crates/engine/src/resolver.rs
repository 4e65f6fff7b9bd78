//! Resolver - drives a board from "has matches" back to stable
//!
//! One resolution cycle is a loop of cascades. Each cascade walks the phase
//! machine:
//!
//! ```text
//! Wait      score the match set, issue one destruction task per gem,
//!           pick a bomb site if the ordinary matches qualify
//! Collapse  place the bomb, wait for the compaction delay and the whole
//!           destruction batch, then apply gravity
//! Refill    fill every empty cell bottom-up, sweep orphans, re-detect
//! ```
//!
//! If re-detection finds matches the loop runs another cascade, otherwise
//! the phase returns to `Move`. Pacing delays are `tokio::time::sleep`s;
//! destruction tasks live in a `JoinSet` and only carry a handle and a
//! delay, so the grid is touched by the sequencer alone.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::config::EngineConfig;
use crate::core::{
    choose_fill_kind, score_matches, should_spawn_bomb, substitute_bomb, Board, BoardError,
    BoardSnapshot, GemId, GemRng, InvariantViolation, MatchSet,
};
use crate::engine_log;
use crate::log::warn;
use crate::types::{GamePhase, GemKind, Pos};

const COMPONENT: &str = "Resolver";

/// Cells filled by one setup or refill pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    /// Cells where every reroll still completed a run
    pub forced: Vec<Pos>,
}

/// What one cascade did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeStep {
    /// Size of the ordinary match list
    pub matched: usize,
    /// Size of the bomb match list
    pub bomb_matched: usize,
    pub destroyed: usize,
    pub points: u32,
    pub bomb_site: Option<Pos>,
    /// Gems moved by gravity
    pub moved: usize,
    pub refill: FillReport,
    pub orphans_swept: usize,
}

/// Summary of a full resolution cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub steps: Vec<CascadeStep>,
    /// The cascade limit stopped the cycle with matches still on the board
    pub truncated: bool,
}

impl CycleReport {
    pub fn cascades(&self) -> usize {
        self.steps.len()
    }

    pub fn points(&self) -> u32 {
        self.steps.iter().map(|s| s.points).sum()
    }

    pub fn destroyed(&self) -> usize {
        self.steps.iter().map(|s| s.destroyed).sum()
    }

    pub fn bombs_spawned(&self) -> usize {
        self.steps.iter().filter(|s| s.bomb_site.is_some()).count()
    }

    pub fn forced_cells(&self) -> Vec<Pos> {
        self.steps
            .iter()
            .flat_map(|s| s.refill.forced.iter().copied())
            .collect()
    }

    pub fn orphans_swept(&self) -> usize {
        self.steps.iter().map(|s| s.orphans_swept).sum()
    }
}

/// Why a swap was refused before touching the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRejection {
    /// A cycle is in flight (or the phase was set externally)
    Locked(GamePhase),
    OutOfRange,
    NotAdjacent,
    EmptyCell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The swap matched and the board has been resolved
    Resolved(CycleReport),
    /// The swap matched nothing and was reverted
    NoMatch,
    Rejected(SwapRejection),
}

/// Board contents plus the externally visible state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub board: BoardSnapshot,
    pub score: u32,
    pub phase: GamePhase,
}

/// Phase sequencer, scorer and spawn policy owner
#[derive(Debug)]
pub struct Resolver {
    board: Board,
    config: EngineConfig,
    kinds: Vec<GemKind>,
    rng: GemRng,
    score: u32,
    /// Working set of the current detection pass
    matches: MatchSet,
    phase_tx: watch::Sender<GamePhase>,
    score_tx: watch::Sender<u32>,
}

impl Resolver {
    /// Create a resolver with an empty board sized by `config`
    pub fn new(config: EngineConfig) -> Result<Self> {
        let board = Board::new(config.width, config.height);
        Self::with_board(config, board)
    }

    /// Create a resolver around an existing board.
    ///
    /// The board's own dimensions win over `config.width` / `config.height`.
    pub fn with_board(config: EngineConfig, board: Board) -> Result<Self> {
        config.validate()?;
        let rng = config.seed.map_or_else(GemRng::from_entropy, GemRng::new);
        let (phase_tx, _) = watch::channel(GamePhase::Move);
        let (score_tx, _) = watch::channel(0u32);

        engine_log!(
            config.verbose,
            "[Resolver] {}x{} board, {} kinds, seed {}",
            board.width(),
            board.height(),
            config.gems.len(),
            rng.seed()
        );

        Ok(Self {
            board,
            kinds: config.kinds(),
            config,
            rng,
            score: 0,
            matches: MatchSet::default(),
            phase_tx,
            score_tx,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Match set from the last detection pass
    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub fn current_state(&self) -> GamePhase {
        *self.phase_tx.borrow()
    }

    /// Set the visible phase. Input layers write `Wait` here when a swap of
    /// theirs produced a match.
    pub fn set_state(&mut self, phase: GamePhase) {
        let previous = self.phase_tx.send_replace(phase);
        if previous != phase {
            engine_log!(
                self.config.verbose,
                "[Resolver] phase {} -> {}",
                previous.as_str(),
                phase.as_str()
            );
        }
    }

    /// Observer handle for the phase flag
    pub fn phase_handle(&self) -> watch::Receiver<GamePhase> {
        self.phase_tx.subscribe()
    }

    /// Observer handle for the running score; every change publishes the
    /// new total
    pub fn score_handle(&self) -> watch::Receiver<u32> {
        self.score_tx.subscribe()
    }

    pub fn get_token(&self, x: i8, y: i8) -> Result<Option<GemId>, BoardError> {
        self.board.get(x, y)
    }

    pub fn set_token(&mut self, x: i8, y: i8, token: Option<GemId>) -> Result<(), BoardError> {
        self.board.set(x, y, token)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            board: self.board.snapshot(),
            score: self.score,
            phase: self.current_state(),
        }
    }

    /// Place a new gem at `pos`, possibly turned into a bomb.
    ///
    /// Match avoidance is the caller's job and must use the kind it asked
    /// for, before this substitution.
    pub fn spawn_at(&mut self, pos: Pos, kind: GemKind) -> Result<GemId, BoardError> {
        let kind = substitute_bomb(kind, self.config.bomb_chance, &mut self.rng);
        let score = self.config.score_for(kind);
        self.board.place(pos, kind, score)
    }

    /// Fill every empty cell without pacing, avoiding runs where possible
    pub fn setup(&mut self) -> FillReport {
        let mut report = FillReport::default();
        for pos in self.board.empty_cells() {
            let kind = self.choose_kind(pos, &mut report);
            self.place_fill(pos, kind, &mut report);
        }
        engine_log!(
            self.config.verbose,
            "[Resolver] setup filled {} cells ({} forced)",
            report.filled,
            report.forced.len()
        );
        report
    }

    /// Rebuild the working match set; true if anything matched
    pub fn find_all_matches(&mut self) -> bool {
        self.matches = self.board.find_all_matches();
        !self.matches.is_empty()
    }

    /// Detect, then resolve if anything matched
    pub async fn run_cycle(&mut self) -> CycleReport {
        if !self.find_all_matches() {
            self.set_state(GamePhase::Move);
            return CycleReport::default();
        }
        self.resolve_matches().await
    }

    /// Swap two neighbouring gems on behalf of the input layer.
    ///
    /// Refused outside `Move`. A swap that matches nothing is undone.
    pub async fn try_swap(&mut self, from: Pos, to: Pos) -> SwapOutcome {
        let phase = self.current_state();
        if !phase.accepts_input() {
            return SwapOutcome::Rejected(SwapRejection::Locked(phase));
        }
        if !self.board.contains(from) || !self.board.contains(to) {
            return SwapOutcome::Rejected(SwapRejection::OutOfRange);
        }
        if !from.is_adjacent(to) {
            return SwapOutcome::Rejected(SwapRejection::NotAdjacent);
        }
        if self.board.kind_at(from.x, from.y).is_none() || self.board.kind_at(to.x, to.y).is_none()
        {
            return SwapOutcome::Rejected(SwapRejection::EmptyCell);
        }

        if let Err(e) = self.board.swap(from, to) {
            warn(COMPONENT, e);
            return SwapOutcome::Rejected(SwapRejection::OutOfRange);
        }
        if !self.find_all_matches() {
            if let Err(e) = self.board.swap(from, to) {
                warn(COMPONENT, e);
            }
            return SwapOutcome::NoMatch;
        }

        self.set_state(GamePhase::Wait);
        SwapOutcome::Resolved(self.resolve_matches().await)
    }

    /// Resolve the current match set until the board is stable.
    ///
    /// The phase stays off `Move` until the last cascade has finished its
    /// refill and re-detection.
    pub async fn resolve_matches(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        while !self.matches.is_empty() {
            if report.steps.len() as u32 >= self.config.max_cascades {
                warn(
                    COMPONENT,
                    format_args!(
                        "cascade limit {} reached with {} gems still matched",
                        self.config.max_cascades,
                        self.matches.len()
                    ),
                );
                report.truncated = true;
                break;
            }
            let step = self.cascade().await;
            report.steps.push(step);
        }

        self.matches = MatchSet::default();
        self.set_state(GamePhase::Move);
        engine_log!(
            self.config.verbose,
            "[Resolver] cycle done: {} cascades, {} destroyed, +{} (total {})",
            report.cascades(),
            report.destroyed(),
            report.points(),
            self.score
        );
        report
    }

    async fn cascade(&mut self) -> CascadeStep {
        let timings = self.config.timings;
        self.set_state(GamePhase::Wait);

        let mut step = CascadeStep {
            matched: self.matches.matches.len(),
            bomb_matched: self.matches.bomb_matches.len(),
            ..CascadeStep::default()
        };

        self.clear_stray_slots();
        let bomb_site = self.bomb_site();
        let points = score_matches(&self.board, &self.matches);
        self.add_score(points.total);
        step.points = points.total;
        let batch = self.issue_destructions();

        self.set_state(GamePhase::Collapse);
        if let Some(pos) = bomb_site {
            match self.spawn_at(pos, GemKind::Bomb) {
                Ok(_) => step.bomb_site = Some(pos),
                Err(e) => warn(COMPONENT, e),
            }
        }
        step.destroyed = self.settle(batch, timings.compaction()).await;
        step.moved = self.board.compact_columns();

        self.set_state(GamePhase::Refill);
        sleep(timings.refill()).await;
        step.refill = self.refill().await;
        step.orphans_swept = self.sweep_orphans();

        sleep(timings.redetect()).await;
        self.find_all_matches();
        sleep(timings.settle()).await;

        step
    }

    /// Empty matched slots that hold a handle placed elsewhere, so the gem
    /// is destroyed once and the slot refilled
    fn clear_stray_slots(&mut self) {
        for (id, pos) in std::mem::take(&mut self.matches.stray) {
            warn(COMPONENT, InvariantViolation::StraySlot { id, pos });
            if self.board.get(pos.x, pos.y) == Ok(Some(id)) {
                if let Err(e) = self.board.set(pos.x, pos.y, None) {
                    warn(COMPONENT, e);
                }
            }
        }
    }

    /// Bomb spawn policy on the pre-destruction ordinary list
    fn bomb_site(&mut self) -> Option<Pos> {
        let (kinds, positions): (Vec<GemKind>, Vec<Pos>) = self
            .matches
            .matches
            .iter()
            .filter_map(|id| self.board.gem(*id))
            .map(|gem| (gem.kind, gem.pos))
            .unzip();
        if !should_spawn_bomb(&kinds) {
            return None;
        }
        self.rng.pick(&positions).copied()
    }

    fn add_score(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.score_tx.send_replace(self.score);
    }

    /// One task per matched gem; bomb-matched gems wait the extra delay
    fn issue_destructions(&self) -> JoinSet<GemId> {
        let bomb_delay = self.config.timings.bomb_destroy();
        let ordinary = self.matches.matches.iter().map(|&id| (id, Duration::ZERO));
        let blasted = self.matches.bomb_matches.iter().map(|&id| (id, bomb_delay));

        let mut batch = JoinSet::new();
        for (id, delay) in ordinary.chain(blasted) {
            if self.board.gem(id).is_none() {
                warn(COMPONENT, InvariantViolation::StaleMatch(id));
                continue;
            }
            batch.spawn(async move {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                id
            });
        }
        batch
    }

    /// Apply removals as the batch completes; returns once every task and
    /// the compaction pause are done
    async fn settle(&mut self, mut batch: JoinSet<GemId>, pause: Duration) -> usize {
        let pause = sleep(pause);
        tokio::pin!(pause);

        let mut destroyed = 0;
        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok(id) => match self.board.despawn(id) {
                    Some(_) => destroyed += 1,
                    None => warn(COMPONENT, InvariantViolation::StaleMatch(id)),
                },
                Err(e) => warn(COMPONENT, format_args!("destruction task failed: {}", e)),
            }
        }

        pause.await;
        destroyed
    }

    async fn refill(&mut self) -> FillReport {
        let step = self.config.timings.refill_step();
        let mut report = FillReport::default();
        for pos in self.board.empty_cells() {
            let kind = self.choose_kind(pos, &mut report);
            if !step.is_zero() {
                sleep(step).await;
            }
            self.place_fill(pos, kind, &mut report);
        }
        report
    }

    fn choose_kind(&mut self, pos: Pos, report: &mut FillReport) -> GemKind {
        let choice = choose_fill_kind(
            &self.board,
            pos,
            &self.kinds,
            self.config.max_iterations,
            &mut self.rng,
        );
        if choice.forced {
            engine_log!(
                self.config.verbose,
                "[Resolver] {} forced to {} after {} rerolls",
                pos,
                choice.kind.as_str(),
                self.config.max_iterations
            );
            report.forced.push(pos);
        }
        choice.kind
    }

    /// Place the chosen kind. A bomb substituted for it is checked again,
    /// since the choice only ruled out runs of the requested kind.
    fn place_fill(&mut self, pos: Pos, kind: GemKind, report: &mut FillReport) {
        let id = match self.spawn_at(pos, kind) {
            Ok(id) => id,
            Err(e) => {
                warn(COMPONENT, e);
                return;
            }
        };
        report.filled += 1;

        let substituted = self.board.gem(id).is_some_and(|gem| gem.kind != kind);
        if substituted
            && self.board.would_match(pos.x, pos.y, GemKind::Bomb)
            && !report.forced.contains(&pos)
        {
            engine_log!(
                self.config.verbose,
                "[Resolver] {} became a bomb that completes a run",
                pos
            );
            report.forced.push(pos);
        }
    }

    /// Despawn live gems no slot references. Never expected to find any.
    fn sweep_orphans(&mut self) -> usize {
        let orphans = self.board.orphans();
        for &id in &orphans {
            if let Some(gem) = self.board.despawn(id) {
                warn(COMPONENT, InvariantViolation::Orphan { id, pos: gem.pos });
            }
        }
        orphans.len()
    }
}
