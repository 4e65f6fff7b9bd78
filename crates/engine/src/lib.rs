//! Resolution engine - async sequencing on top of the core board
//!
//! This crate turns the pure rules of `gem-cascade-core` into a running game:
//! a [`Resolver`] walks the `Move -> Wait -> Collapse -> Refill` phase
//! machine with paced delays, and a [`Driver`] feeds it swap commands from
//! the input layer over a channel.
//!
//! # Concurrency
//!
//! Everything runs on one logical timeline. Delays are `tokio::time::sleep`
//! calls; per-gem destruction tasks are spawned into a `JoinSet` and the
//! resolver waits for the whole batch before gravity runs. Only one cycle
//! can be in flight because the resolver is borrowed mutably for its
//! duration.
//!
//! # Observing the engine
//!
//! - [`Resolver::phase_handle`]: `watch` receiver for the phase flag. Input
//!   layers must refuse swaps unless it reads `Move`.
//! - [`Resolver::score_handle`]: `watch` receiver publishing the running
//!   total whenever it changes.
//!
//! # Example
//!
//! ```
//! use gem_cascade_engine::{EngineConfig, Resolver, Timings};
//! use gem_cascade_engine::types::GamePhase;
//!
//! # tokio_test::block_on(async {
//! let config = EngineConfig {
//!     seed: Some(7),
//!     timings: Timings::instant(),
//!     ..EngineConfig::default()
//! };
//! let mut resolver = Resolver::new(config).unwrap();
//! resolver.setup();
//!
//! let report = resolver.run_cycle().await;
//! assert!(!report.truncated);
//! assert_eq!(resolver.current_state(), GamePhase::Move);
//! # });
//! ```

pub mod config;
pub mod driver;
pub mod log;
pub mod resolver;

pub use gem_cascade_core as core;
pub use gem_cascade_types as types;

pub use config::{EngineConfig, GemSpec, Timings};
pub use driver::{Command, Driver, DriverHandle};
pub use resolver::{
    CascadeStep, CycleReport, EngineSnapshot, FillReport, Resolver, SwapOutcome, SwapRejection,
};
