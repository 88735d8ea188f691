//! Administrative wipe.
//!
//! Maps straight onto `clear`/`clear_all`. Privilege is out of band
//! here: whoever can run the binary against the data directory is the
//! operator.

use tracing::info;

use std::path::Path;

use banterline_core::store::ConversationStore;
use banterline_types::config::AppConfig;
use banterline_types::participant::ParticipantId;

use super::{AnyStore, open_store};

pub async fn run(
    config: AppConfig,
    data_dir: &Path,
    participant: Option<u64>,
) -> anyhow::Result<()> {
    match open_store(&config, data_dir).await? {
        AnyStore::Memory(store) => wipe(store.as_ref(), participant).await,
        AnyStore::Sqlite(store) => wipe(store.as_ref(), participant).await,
    }
}

async fn wipe<S: ConversationStore>(store: &S, participant: Option<u64>) -> anyhow::Result<()> {
    match participant {
        Some(id) => {
            store.clear(ParticipantId(id)).await?;
            info!(participant = id, "wiped one participant");
            println!("Forgot participant {id}.");
        }
        None => {
            store.clear_all().await?;
            info!("wiped all participants");
            println!("Wiped all conversation history.");
        }
    }
    Ok(())
}
