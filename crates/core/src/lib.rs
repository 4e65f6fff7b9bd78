//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds the grid model and everything that can be decided
//! without a clock: match detection, gravity, scoring and the spawn
//! policies. It has **no** timing, I/O or async dependencies, making it:
//!
//! - **Deterministic**: the same seed produces the same boards and refills
//! - **Testable**: every rule is a plain function over a [`Board`]
//! - **Portable**: the async resolver is layered on top in `gem-cascade-engine`
//!
//! # Module Structure
//!
//! - [`board`]: W x H grid of gem handles, gravity compaction
//! - [`pool`]: arena of gems with generational handles
//! - [`matching`]: `would_match` and the full `find_all_matches` scan
//! - [`policy`]: bomb substitution, bomb spawning and fill selection
//! - [`scoring`]: points for a detection pass
//! - [`snapshot`]: kind-only copy of the grid with a stable hash
//! - [`rng`]: seeded randomness
//! - [`error`]: grid access errors and invariant reports
//!
//! # Example
//!
//! ```
//! use gem_cascade_core::Board;
//!
//! let mut board = Board::from_rows(&[
//!     "gby",
//!     "byg",
//!     "rrr",
//! ]);
//!
//! let matches = board.find_all_matches();
//! assert_eq!(matches.matches.len(), 3);
//!
//! for id in matches.iter() {
//!     board.despawn(id);
//! }
//! board.compact_columns();
//! assert_eq!(board.empty_cells().len(), 3);
//! ```

pub mod board;
pub mod error;
pub mod matching;
pub mod policy;
pub mod pool;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use gem_cascade_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use error::{BoardError, InvariantViolation};
pub use matching::{MatchGroup, MatchSet};
pub use policy::{choose_fill_kind, should_spawn_bomb, substitute_bomb, FillChoice};
pub use pool::{Gem, GemId, GemPool};
pub use rng::GemRng;
pub use scoring::{score_matches, MatchScore};
pub use snapshot::BoardSnapshot;
