//! Gem Cascade (workspace facade crate).
//!
//! Re-exports the member crates under short names so applications and tests
//! can write `gem_cascade::{core,engine,types}`. The implementation lives in
//! the dedicated crates under `crates/`.

pub use gem_cascade_core as core;
pub use gem_cascade_engine as engine;
pub use gem_cascade_types as types;
