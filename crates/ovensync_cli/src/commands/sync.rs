//! Sync command implementation.

use super::CliEngine;
use ovensync_engine::PushOutcome;

/// Runs the sync command: push, then pull.
pub async fn run(
    engine: &CliEngine,
    token: &str,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = engine.sync(token, user_id).await;

    match &report.pushed {
        PushOutcome::NothingPending => println!("Push: nothing pending"),
        PushOutcome::Pushed { operations } => println!("Push: {} operations", operations),
        PushOutcome::Failed(e) => println!("Push: failed ({})", e),
    }

    match report.pulled.snapshot() {
        Some(snapshot) => super::pull::print_summary(engine, snapshot),
        None => println!("Pull: failed"),
    }

    if let Some(e) = report.pulled.error() {
        return Err(e.to_string().into());
    }
    if let PushOutcome::Failed(e) = report.pushed {
        return Err(e.into());
    }

    Ok(())
}
