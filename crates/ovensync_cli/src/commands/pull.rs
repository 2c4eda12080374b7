//! Pull command implementation.

use super::CliEngine;
use ovensync_engine::{EntityType, PullOutcome, Snapshot};
use std::path::Path;
use tracing::info;

/// Runs the pull command.
pub async fn run(
    engine: &CliEngine,
    token: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = match engine.pull(token).await {
        PullOutcome::Pulled(snapshot) => snapshot,
        PullOutcome::Failed(e) => return Err(e.into()),
    };

    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
            info!("Wrote snapshot to {:?}", path);
        }
        None => print_summary(engine, &snapshot),
    }

    Ok(())
}

/// Prints entity counts and the local edits a caller would keep.
pub fn print_summary(engine: &CliEngine, snapshot: &Snapshot) {
    println!("Server Snapshot");
    println!("===============");
    for entity_type in EntityType::ALL {
        println!(
            "  {:<12} {}",
            entity_type.collection(),
            snapshot.collection(entity_type).len()
        );
    }
    if !snapshot.settings.is_empty() {
        let keys: Vec<&str> = snapshot.settings.keys().map(String::as_str).collect();
        println!("  settings     {}", keys.join(", "));
    }

    let pending = engine.pending_count();
    if pending > 0 {
        println!();
        println!("{} entities have local edits pending", pending);
    }
}
