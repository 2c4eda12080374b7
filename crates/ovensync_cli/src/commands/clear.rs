//! Clear command implementation.

use super::CliEngine;
use tracing::info;

/// Runs the clear command.
pub fn run(engine: &CliEngine) -> Result<(), Box<dyn std::error::Error>> {
    let pending = engine.pending_count();
    if pending > 0 {
        info!("Discarding {} unsynced operations", pending);
    }

    engine.clear()?;
    println!("Sync state cleared");

    Ok(())
}
