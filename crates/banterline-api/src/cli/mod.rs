//! CLI argument definitions and shared store plumbing.

pub mod chat;
pub mod console_transport;
pub mod stats;
pub mod wipe;

use clap::{Parser, Subcommand};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use banterline_core::store::MemoryConversationStore;
use banterline_infra::sqlite::{DatabasePool, SqliteConversationStore, pool::database_url_in};
use banterline_types::config::{AppConfig, StoreBackend};

#[derive(Parser)]
#[command(name = "bline", about = "Banterline chat agent console", version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Data directory (defaults to $BANTERLINE_DATA_DIR or ~/.banterline)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the agent from the console
    Chat {
        /// Participant ID to chat as
        #[arg(long, default_value_t = 1)]
        user: u64,
    },

    /// Forget one participant's history, or everything
    Wipe {
        /// Participant to forget; omit to wipe everyone
        #[arg(long)]
        participant: Option<u64>,
    },

    /// Show who the agent remembers
    Stats,
}

/// A conversation store of either configured backend.
pub enum AnyStore {
    Memory(Arc<MemoryConversationStore>),
    Sqlite(Arc<SqliteConversationStore>),
}

/// Open the conversation store named by the configuration.
pub async fn open_store(config: &AppConfig, data_dir: &Path) -> anyhow::Result<AnyStore> {
    match config.memory.backend {
        StoreBackend::Memory => Ok(AnyStore::Memory(Arc::new(MemoryConversationStore::new(
            &config.memory,
        )))),
        StoreBackend::Sqlite => {
            tokio::fs::create_dir_all(data_dir).await?;
            let url = config
                .memory
                .database_url
                .clone()
                .unwrap_or_else(|| database_url_in(data_dir));
            let pool = DatabasePool::new(&url).await?;
            Ok(AnyStore::Sqlite(Arc::new(SqliteConversationStore::new(
                pool,
                &config.memory,
            ))))
        }
    }
}
