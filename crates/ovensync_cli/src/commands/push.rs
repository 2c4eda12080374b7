//! Push command implementation.

use super::CliEngine;
use ovensync_engine::PushOutcome;

/// Runs the push command.
pub async fn run(
    engine: &CliEngine,
    token: &str,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match engine.push(token, user_id).await {
        PushOutcome::NothingPending => println!("Nothing to push"),
        PushOutcome::Pushed { operations } => println!("Pushed {} operations", operations),
        PushOutcome::Failed(e) => {
            println!("Push failed; {} operations still pending", engine.pending_count());
            return Err(e.into());
        }
    }

    Ok(())
}
