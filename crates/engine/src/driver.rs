//! Driver - command loop in front of a [`Resolver`]
//!
//! The input layer talks to the engine through a bounded channel. Commands
//! are handled one at a time, so a swap that starts a cycle is fully
//! resolved before the next command is read, and a shutdown request can
//! only land between cycles.

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot, watch};

use crate::engine_log;
use crate::resolver::{EngineSnapshot, Resolver, SwapOutcome};
use crate::types::{GamePhase, Pos};

/// Command delivered to the driver loop
#[derive(Debug)]
pub enum Command {
    Swap {
        from: Pos,
        to: Pos,
        reply: oneshot::Sender<SwapOutcome>,
    },
    Snapshot(oneshot::Sender<EngineSnapshot>),
    Shutdown,
}

/// Owns the resolver while the loop runs
pub struct Driver {
    resolver: Resolver,
    cmd_rx: mpsc::Receiver<Command>,
}

/// Cloneable sender side of a [`Driver`]
#[derive(Debug, Clone)]
pub struct DriverHandle {
    cmd_tx: mpsc::Sender<Command>,
    phase: watch::Receiver<GamePhase>,
    score: watch::Receiver<u32>,
}

impl Driver {
    /// Wrap `resolver`; at most `max_pending` commands queue up while a
    /// cycle runs.
    pub fn new(resolver: Resolver, max_pending: usize) -> (Self, DriverHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(max_pending.max(1));
        let handle = DriverHandle {
            cmd_tx,
            phase: resolver.phase_handle(),
            score: resolver.score_handle(),
        };
        (Self { resolver, cmd_rx }, handle)
    }

    /// Run until `Shutdown` or until every handle is dropped; hands the
    /// resolver back for inspection.
    pub async fn run(mut self) -> Resolver {
        let verbose = self.resolver.config().verbose;
        engine_log!(verbose, "[Driver] running");

        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                Command::Swap { from, to, reply } => {
                    let outcome = self.resolver.try_swap(from, to).await;
                    engine_log!(verbose, "[Driver] swap {} <-> {}: {:?}", from, to, outcome);
                    let _ = reply.send(outcome);
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.resolver.snapshot());
                }
                Command::Shutdown => {
                    engine_log!(verbose, "[Driver] shutdown requested");
                    break;
                }
            }
        }

        engine_log!(verbose, "[Driver] stopped");
        self.resolver
    }
}

impl DriverHandle {
    /// Ask for a swap and wait for the cycle it triggers to finish
    pub async fn swap(&self, from: Pos, to: Pos) -> Result<SwapOutcome> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Swap { from, to, reply })
            .await
            .map_err(|_| anyhow!("driver: loop has stopped"))?;
        rx.await.map_err(|_| anyhow!("driver: swap reply dropped"))
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| anyhow!("driver: loop has stopped"))?;
        rx.await.map_err(|_| anyhow!("driver: snapshot reply dropped"))
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| anyhow!("driver: loop has stopped"))
    }

    /// Phase as last published by the resolver
    pub fn phase(&self) -> GamePhase {
        *self.phase.borrow()
    }

    pub fn phase_updates(&self) -> watch::Receiver<GamePhase> {
        self.phase.clone()
    }

    pub fn score(&self) -> u32 {
        *self.score.borrow()
    }

    pub fn score_updates(&self) -> watch::Receiver<u32> {
        self.score.clone()
    }
}
