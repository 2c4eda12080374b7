//! ovensync CLI
//!
//! Command-line tools for the offline-first sync engine.
//!
//! # Commands
//!
//! - `record` - Record a local change to an entity
//! - `push` - Push pending operations to the server
//! - `pull` - Pull the server's full snapshot
//! - `sync` - Push, then pull
//! - `status` - Show pending count and sync watermarks
//! - `log` - Dump the operation log for debugging
//! - `compact` - Trim synced history
//! - `clear` - Wipe all sync state (sign-out)

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ovensync command-line sync tools.
#[derive(Parser)]
#[command(name = "ovensync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the sync metadata
    #[arg(global = true, short, long)]
    data_dir: Option<PathBuf>,

    /// Sync endpoint URL
    #[arg(global = true, short, long)]
    endpoint: Option<String>,

    /// Bearer token for the sync endpoint
    #[arg(global = true, short, long)]
    token: Option<String>,

    /// User ID sent with pushes
    #[arg(global = true, short, long)]
    user_id: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a local change to an entity
    Record {
        /// Entity type (recipe, order, customer, ingredient, inventory)
        entity_type: String,

        /// Entity ID
        entity_id: String,

        /// Operation kind (create, update, delete)
        kind: String,

        /// Entity snapshot as JSON (required for create and update)
        #[arg(long)]
        data: Option<String>,
    },

    /// Push pending operations to the server
    Push,

    /// Pull the server's full snapshot
    Pull {
        /// Write the snapshot to this file instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Push pending operations, then pull the server's snapshot
    Sync,

    /// Show pending count and sync watermarks
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Dump the operation log for debugging
    Log {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Only show unsynced operations
        #[arg(short, long)]
        pending: bool,
    },

    /// Trim synced history to the configured limit
    Compact,

    /// Wipe all sync state
    Clear,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let data_dir = || {
        cli.data_dir
            .as_deref()
            .ok_or("Data directory required (--data-dir)")
    };
    let endpoint = cli.endpoint.as_deref();

    match cli.command {
        Commands::Record {
            entity_type,
            entity_id,
            kind,
            data,
        } => {
            let engine = commands::open_engine(data_dir()?, endpoint)?;
            commands::record::run(&engine, &entity_type, &entity_id, &kind, data.as_deref())?;
        }
        Commands::Push => {
            let endpoint = endpoint.ok_or("Endpoint required for push")?;
            let token = cli.token.ok_or("Token required for push")?;
            let user_id = cli.user_id.ok_or("User ID required for push")?;
            let engine = commands::open_engine(data_dir()?, Some(endpoint))?;
            commands::push::run(&engine, &token, &user_id).await?;
        }
        Commands::Pull { output } => {
            let endpoint = endpoint.ok_or("Endpoint required for pull")?;
            let token = cli.token.ok_or("Token required for pull")?;
            let engine = commands::open_engine(data_dir()?, Some(endpoint))?;
            commands::pull::run(&engine, &token, output.as_deref()).await?;
        }
        Commands::Sync => {
            let endpoint = endpoint.ok_or("Endpoint required for sync")?;
            let token = cli.token.ok_or("Token required for sync")?;
            let user_id = cli.user_id.ok_or("User ID required for sync")?;
            let engine = commands::open_engine(data_dir()?, Some(endpoint))?;
            commands::sync::run(&engine, &token, &user_id).await?;
        }
        Commands::Status { format } => {
            let engine = commands::open_engine(data_dir()?, endpoint)?;
            commands::status::run(&engine, &format)?;
        }
        Commands::Log { format, pending } => {
            let engine = commands::open_engine(data_dir()?, endpoint)?;
            commands::dump_log::run(&engine, &format, pending)?;
        }
        Commands::Compact => {
            let engine = commands::open_engine(data_dir()?, endpoint)?;
            commands::compact::run(&engine)?;
        }
        Commands::Clear => {
            let engine = commands::open_engine(data_dir()?, endpoint)?;
            commands::clear::run(&engine)?;
        }
        Commands::Version => {
            println!("ovensync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ovensync engine v{}", ovensync_engine::VERSION);
        }
    }

    Ok(())
}
