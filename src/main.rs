//! Headless gem-cascade runner (default binary).
//!
//! Builds a board from the `GEM_CASCADE_*` environment (see
//! `EngineConfig::from_env`), plays random swaps through the driver and
//! prints the board after every swap that resolved.
//!
//! Usage: `gem-cascade [SWAPS]` (default 20). Set `GEM_CASCADE_INSTANT=1`
//! to skip the pacing delays.

use anyhow::{Context, Result};

use gem_cascade::core::GemRng;
use gem_cascade::engine::{Driver, EngineConfig, Resolver, SwapOutcome};
use gem_cascade::types::Pos;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let swaps: usize = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid swap count: {}", arg))?,
        None => 20,
    };

    let config = EngineConfig::from_env()?;
    let mut resolver = Resolver::new(config)?;
    let setup = resolver.setup();
    println!(
        "[Demo] seed {}, {} cells filled ({} forced)",
        resolver.seed(),
        setup.filled,
        setup.forced.len()
    );
    print!("{}", resolver.board());

    let width = resolver.board().width() as usize;
    let height = resolver.board().height() as usize;
    let mut rng = GemRng::new(resolver.seed().wrapping_add(1));

    let (driver, handle) = Driver::new(resolver, 16);
    let task = tokio::spawn(driver.run());

    let mut resolved = 0usize;
    let mut attempts = 0usize;
    while resolved < swaps && attempts < swaps.saturating_mul(50) {
        attempts += 1;
        let from = Pos::new(rng.next_range(width) as i8, rng.next_range(height) as i8);
        let Some(&to) = rng.pick(&from.neighbors()) else {
            continue;
        };

        if let SwapOutcome::Resolved(report) = handle.swap(from, to).await? {
            resolved += 1;
            println!(
                "[Demo] swap {} <-> {}: {} cascades, {} destroyed, {} bombs, +{} (score {})",
                from,
                to,
                report.cascades(),
                report.destroyed(),
                report.bombs_spawned(),
                report.points(),
                handle.score()
            );
            let snap = handle.snapshot().await?;
            for row in snap.board.rows() {
                println!("  {}", row);
            }
        }
    }

    handle.shutdown().await?;
    let resolver = task.await.context("driver task failed")?;
    println!(
        "[Demo] {} swaps resolved in {} attempts, final score {}",
        resolved,
        attempts,
        resolver.score()
    );
    Ok(())
}
