//! Status command implementation.

use super::CliEngine;
use serde::Serialize;

/// Sync status representation for output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    /// Unsynced operations.
    pub pending_count: usize,
    /// Synced operations kept as history.
    pub synced_count: usize,
    /// Milliseconds since the last successful push.
    pub ms_since_last_push: Option<u64>,
    /// Milliseconds since the last successful pull.
    pub ms_since_last_pull: Option<u64>,
    /// Last successful push, Unix millis.
    pub last_push_at: Option<u64>,
    /// Last successful pull, Unix millis.
    pub last_pull_at: Option<u64>,
}

/// Runs the status command.
pub fn run(engine: &CliEngine, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let status = engine.status();
    let synced_count = engine.operations().iter().filter(|op| op.synced).count();

    let info = StatusInfo {
        pending_count: status.pending_count,
        synced_count,
        ms_since_last_push: status.ms_since_last_push,
        ms_since_last_pull: status.ms_since_last_pull,
        last_push_at: status.last_push_at,
        last_pull_at: status.last_pull_at,
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&info)?),
        _ => print_text_output(&info),
    }

    Ok(())
}

fn print_text_output(info: &StatusInfo) {
    println!("Sync Status");
    println!("===========");
    println!("  Pending operations: {}", info.pending_count);
    println!("  Synced history:     {}", info.synced_count);
    println!("  Last push:          {}", describe_age(info.ms_since_last_push));
    println!("  Last pull:          {}", describe_age(info.ms_since_last_pull));
}

fn describe_age(ms: Option<u64>) -> String {
    match ms {
        None => "never".to_string(),
        Some(ms) if ms < 1_000 => format!("{} ms ago", ms),
        Some(ms) if ms < 60_000 => format!("{} s ago", ms / 1_000),
        Some(ms) if ms < 3_600_000 => format!("{} min ago", ms / 60_000),
        Some(ms) => format!("{} h ago", ms / 3_600_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ages_are_human_readable() {
        assert_eq!(describe_age(None), "never");
        assert_eq!(describe_age(Some(250)), "250 ms ago");
        assert_eq!(describe_age(Some(5_500)), "5 s ago");
        assert_eq!(describe_age(Some(120_000)), "2 min ago");
        assert_eq!(describe_age(Some(7_200_000)), "2 h ago");
    }
}
