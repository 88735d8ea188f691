//! Memory statistics: who the agent remembers, and how much.

use comfy_table::{ContentArrangement, Table, presets};

use std::path::Path;

use banterline_core::store::ConversationStore;
use banterline_types::config::AppConfig;

use super::{AnyStore, open_store};

pub async fn run(config: AppConfig, data_dir: &Path) -> anyhow::Result<()> {
    match open_store(&config, data_dir).await? {
        AnyStore::Memory(store) => render_counts(store.as_ref()).await,
        AnyStore::Sqlite(store) => render_counts(store.as_ref()).await,
    }
}

/// Print per-participant live turn counts, busiest first.
pub(crate) async fn render_counts<S: ConversationStore>(store: &S) -> anyhow::Result<()> {
    let counts = store.participant_counts().await?;

    if counts.is_empty() {
        println!("Memory is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Participant", "Turns"]);

    for (participant_id, count) in counts {
        table.add_row(vec![participant_id.to_string(), count.to_string()]);
    }

    println!("{table}");
    Ok(())
}
