//! Engine configuration
//!
//! Everything the resolver needs is injected through [`EngineConfig`]:
//! board size, the gem set and score values, bomb chance, rejection cap,
//! pacing and the RNG seed. A config can come from defaults, a JSON file or
//! `GEM_CASCADE_*` environment variables, and is immutable once the
//! resolver is built.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::*;

/// One ordinary gem kind and what it is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GemSpec {
    pub kind: GemKind,
    pub score: u32,
}

/// Pacing delays between phases, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub compaction_ms: u64,
    pub bomb_destroy_ms: u64,
    pub refill_ms: u64,
    pub refill_step_ms: u64,
    pub redetect_ms: u64,
    pub settle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            compaction_ms: COMPACTION_DELAY_MS,
            bomb_destroy_ms: BOMB_DESTROY_DELAY_MS,
            refill_ms: REFILL_DELAY_MS,
            refill_step_ms: REFILL_STEP_MS,
            redetect_ms: REDETECT_DELAY_MS,
            settle_ms: SETTLE_DELAY_MS,
        }
    }
}

impl Timings {
    /// No pacing at all (headless runs, benches)
    pub fn instant() -> Self {
        Self {
            compaction_ms: 0,
            bomb_destroy_ms: 0,
            refill_ms: 0,
            refill_step_ms: 0,
            redetect_ms: 0,
            settle_ms: 0,
        }
    }

    pub fn compaction(&self) -> Duration {
        Duration::from_millis(self.compaction_ms)
    }

    pub fn bomb_destroy(&self) -> Duration {
        Duration::from_millis(self.bomb_destroy_ms)
    }

    pub fn refill(&self) -> Duration {
        Duration::from_millis(self.refill_ms)
    }

    pub fn refill_step(&self) -> Duration {
        Duration::from_millis(self.refill_step_ms)
    }

    pub fn redetect(&self) -> Duration {
        Duration::from_millis(self.redetect_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: u8,
    pub height: u8,
    /// Ordinary kinds used by setup and refill
    pub gems: Vec<GemSpec>,
    pub bomb_score: u32,
    /// Chance in percent (0-100) that a spawned gem becomes a bomb
    pub bomb_chance: f32,
    pub max_iterations: u32,
    pub max_cascades: u32,
    pub timings: Timings,
    /// Fixed seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            gems: GemKind::ORDINARY
                .iter()
                .map(|&kind| GemSpec {
                    kind,
                    score: GEM_SCORE,
                })
                .collect(),
            bomb_score: BOMB_SCORE,
            bomb_chance: BOMB_CHANCE_PERCENT,
            max_iterations: MAX_ITERATIONS,
            max_cascades: MAX_CASCADES,
            timings: Timings::default(),
            seed: None,
            verbose: false,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(s).map_err(|e| anyhow!("config: invalid JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("config: cannot read {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Build from environment variables.
    ///
    /// `GEM_CASCADE_CONFIG` names a JSON file to start from; the other
    /// variables override single fields and are ignored when unparsable:
    /// `GEM_CASCADE_WIDTH`, `GEM_CASCADE_HEIGHT`, `GEM_CASCADE_SEED`,
    /// `GEM_CASCADE_BOMB_CHANCE`, `GEM_CASCADE_MAX_ITERATIONS`,
    /// `GEM_CASCADE_INSTANT` (`1`/`true` disables pacing) and
    /// `GEM_CASCADE_VERBOSE`.
    pub fn from_env() -> Result<Self> {
        use std::env;

        fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|s| s.trim().parse().ok())
        }

        fn flag(name: &str) -> bool {
            env::var(name)
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false)
        }

        let mut config = match env::var("GEM_CASCADE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim())?,
            _ => Self::default(),
        };

        if let Some(width) = parsed("GEM_CASCADE_WIDTH") {
            config.width = width;
        }
        if let Some(height) = parsed("GEM_CASCADE_HEIGHT") {
            config.height = height;
        }
        if let Some(seed) = parsed("GEM_CASCADE_SEED") {
            config.seed = Some(seed);
        }
        if let Some(chance) = parsed("GEM_CASCADE_BOMB_CHANCE") {
            config.bomb_chance = chance;
        }
        if let Some(max_iterations) = parsed("GEM_CASCADE_MAX_ITERATIONS") {
            config.max_iterations = max_iterations;
        }
        if flag("GEM_CASCADE_INSTANT") {
            config.timings = Timings::instant();
        }
        if flag("GEM_CASCADE_VERBOSE") {
            config.verbose = true;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let max_side = i8::MAX as u8;
        if self.width == 0 || self.height == 0 || self.width > max_side || self.height > max_side {
            bail!(
                "config: board must be between 1x1 and {}x{}, got {}x{}",
                max_side,
                max_side,
                self.width,
                self.height
            );
        }
        if self.gems.is_empty() {
            bail!("config: at least one gem kind is required");
        }
        if let Some(spec) = self.gems.iter().find(|g| g.kind.is_bomb()) {
            bail!("config: {} cannot be an ordinary gem", spec.kind.as_str());
        }
        for (i, spec) in self.gems.iter().enumerate() {
            if self.gems[..i].iter().any(|g| g.kind == spec.kind) {
                bail!("config: gem kind {} listed twice", spec.kind.as_str());
            }
        }
        if !self.bomb_chance.is_finite() || !(0.0..=100.0).contains(&self.bomb_chance) {
            bail!("config: bomb_chance must be within 0..=100, got {}", self.bomb_chance);
        }
        if self.max_cascades == 0 {
            bail!("config: max_cascades must be at least 1");
        }
        Ok(())
    }

    /// Ordinary kinds in configured order
    pub fn kinds(&self) -> Vec<GemKind> {
        self.gems.iter().map(|g| g.kind).collect()
    }

    /// Score value for a kind; unknown ordinary kinds are worth nothing
    pub fn score_for(&self, kind: GemKind) -> u32 {
        if kind.is_bomb() {
            return self.bomb_score;
        }
        self.gems
            .iter()
            .find(|g| g.kind == kind)
            .map_or(0, |g| g.score)
    }
}
