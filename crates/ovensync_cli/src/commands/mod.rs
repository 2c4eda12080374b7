//! CLI command implementations.

pub mod clear;
pub mod compact;
pub mod dump_log;
pub mod pull;
pub mod push;
pub mod record;
pub mod status;
pub mod sync;

use ovensync_engine::{HttpTransport, SyncConfig, SyncEngine};
use ovensync_storage::FileStore;
use std::path::Path;
use tracing::debug;

/// Engine over a file store talking HTTP.
pub type CliEngine = SyncEngine<HttpTransport, FileStore>;

/// Opens the engine for `data_dir`.
///
/// Commands that never reach the server may pass no endpoint.
pub fn open_engine(
    data_dir: &Path,
    endpoint: Option<&str>,
) -> Result<CliEngine, Box<dyn std::error::Error>> {
    let config = SyncConfig::new(endpoint.unwrap_or_default());
    let transport = HttpTransport::from_config(&config)?;
    let store = FileStore::open(data_dir)?;
    debug!("Opened sync store at {:?}", data_dir);
    Ok(SyncEngine::open(config, transport, store))
}
