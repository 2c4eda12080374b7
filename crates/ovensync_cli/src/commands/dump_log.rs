//! Dump log command implementation.

use super::CliEngine;

/// Runs the log command.
pub fn run(
    engine: &CliEngine,
    format: &str,
    pending_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let operations = if pending_only {
        engine.pending_operations()
    } else {
        engine.operations()
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
        _ => {
            println!(
                "{:<8} {:<11} {:<20} {:<7} {:>14}  ID",
                "STATE", "TYPE", "ENTITY", "KIND", "RECORDED AT"
            );
            for op in &operations {
                println!(
                    "{:<8} {:<11} {:<20} {:<7} {:>14}  {}",
                    if op.synced { "synced" } else { "pending" },
                    op.entity_type,
                    op.entity_id,
                    op.kind,
                    op.recorded_at,
                    op.id
                );
            }
            println!();
            println!("Total: {} operations", operations.len());
        }
    }

    Ok(())
}
