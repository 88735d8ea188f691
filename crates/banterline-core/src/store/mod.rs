//! Conversation store trait and backends.
//!
//! A conversation store owns all turn data for the process lifetime.
//! The contract every backend honors:
//!
//! - `read_recent` returns at most the configured number of turns,
//!   oldest first, and never returns a turn older than the retention
//!   window. An unknown participant reads as empty.
//! - `append` assigns `created_at` from the store's clock and is atomic:
//!   readers never observe a partially appended turn.
//! - Expired turns are permanently unrecoverable, and the backend must
//!   eventually reclaim them (not just filter them) so memory stays
//!   bounded for idle participants.

pub mod memory;

use banterline_types::error::StoreError;
use banterline_types::participant::ParticipantId;
use banterline_types::turn::{ContentPart, Turn, TurnRole};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use std::sync::Arc;
use std::time::Duration;

pub use memory::MemoryConversationStore;

/// Bounded, TTL-expiring, per-participant conversation log.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The
/// persistent implementation lives in `banterline-infra`.
pub trait ConversationStore: Send + Sync {
    /// Append one turn, stamping it with the store clock's "now".
    fn append(
        &self,
        participant_id: ParticipantId,
        role: TurnRole,
        parts: Vec<ContentPart>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// The most recent turns within the retention window, oldest first.
    fn read_recent(
        &self,
        participant_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, StoreError>> + Send;

    /// Remove all turns for one participant. No-op if none exist.
    fn clear(
        &self,
        participant_id: ParticipantId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Remove all turns for all participants.
    fn clear_all(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Reclaim expired turns. Returns how many were removed.
    fn sweep_expired(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Live turn counts per participant, highest first.
    fn participant_counts(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<(ParticipantId, u64)>, StoreError>> + Send;
}

/// Run the expiry sweep on an interval until the token is cancelled.
///
/// Spawn this once at startup; sweep failures are logged and the loop
/// keeps going, so a transient backend error never kills reclamation.
pub async fn sweep_loop<S>(store: Arc<S>, every: Duration, cancel: CancellationToken)
where
    S: ConversationStore,
{
    let mut ticker = tokio::time::interval(every);
    // The first tick fires immediately; skip it so startup stays quick.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("conversation sweep loop stopped");
                return;
            }
            _ = ticker.tick() => {
                match store.sweep_expired().await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "swept expired conversation turns"),
                    Err(err) => warn!(error = %err, "conversation sweep failed"),
                }
            }
        }
    }
}
