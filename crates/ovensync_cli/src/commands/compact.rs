//! Compact command implementation.

use super::CliEngine;

/// Runs the compact command.
pub fn run(engine: &CliEngine) -> Result<(), Box<dyn std::error::Error>> {
    let before = engine.operations().len();
    let removed = engine.compact()?;

    println!("Compaction:");
    println!("  History limit:     {}", engine.config().history_limit);
    println!("  Operations before: {}", before);
    println!("  Removed:           {}", removed);
    println!("  Operations after:  {}", before - removed);

    Ok(())
}
