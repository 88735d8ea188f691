//! In-process conversation store.
//!
//! Backend (a): a concurrent map of per-participant turn logs. Appends
//! compact each log in place (dropping expired turns and overflow past
//! the cap), and the periodic sweep reclaims logs whose participants
//! have gone idle. Mutation is exclusive per map shard, so appends for
//! different participants only contend for the bounded shard lock.

use banterline_types::config::MemoryConfig;
use banterline_types::error::StoreError;
use banterline_types::participant::ParticipantId;
use banterline_types::turn::{ContentPart, Turn, TurnRole};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::store::ConversationStore;

/// Backend (a): bounded in-process conversation log map.
pub struct MemoryConversationStore {
    turns: DashMap<ParticipantId, Vec<Turn>>,
    retention: Duration,
    cap: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryConversationStore {
    /// Build a store on the system clock.
    pub fn new(config: &MemoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a store on an injected clock.
    pub fn with_clock(config: &MemoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            turns: DashMap::new(),
            retention: config.retention_window(),
            cap: config.max_turns,
            clock,
        }
    }

    fn is_live(&self, turn: &Turn, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(turn.created_at) < self.retention
    }

    /// Drop expired turns and overflow past the cap, oldest first.
    fn compact(&self, log: &mut Vec<Turn>, now: DateTime<Utc>) {
        log.retain(|turn| self.is_live(turn, now));
        if log.len() > self.cap {
            let overflow = log.len() - self.cap;
            log.drain(..overflow);
        }
    }
}

impl ConversationStore for MemoryConversationStore {
    async fn append(
        &self,
        participant_id: ParticipantId,
        role: TurnRole,
        parts: Vec<ContentPart>,
    ) -> Result<(), StoreError> {
        let now = self.clock.now();
        let turn = Turn {
            id: Uuid::now_v7(),
            participant_id,
            role,
            parts,
            created_at: now,
        };

        let mut log = self.turns.entry(participant_id).or_default();
        log.push(turn);
        self.compact(&mut log, now);
        Ok(())
    }

    async fn read_recent(
        &self,
        participant_id: ParticipantId,
    ) -> Result<Vec<Turn>, StoreError> {
        let Some(log) = self.turns.get(&participant_id) else {
            return Ok(Vec::new());
        };

        let now = self.clock.now();
        let live: Vec<Turn> = log
            .iter()
            .filter(|turn| self.is_live(turn, now))
            .cloned()
            .collect();

        let overflow = live.len().saturating_sub(self.cap);
        Ok(live.into_iter().skip(overflow).collect())
    }

    async fn clear(&self, participant_id: ParticipantId) -> Result<(), StoreError> {
        self.turns.remove(&participant_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.turns.clear();
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut removed = 0u64;

        // Collect keys first: mutating while holding an iterator would
        // hold shard locks across the whole sweep.
        let participants: Vec<ParticipantId> =
            self.turns.iter().map(|entry| *entry.key()).collect();

        for participant_id in participants {
            if let Some(mut log) = self.turns.get_mut(&participant_id) {
                let before = log.len();
                log.retain(|turn| self.is_live(turn, now));
                removed += (before - log.len()) as u64;
                let emptied = log.is_empty();
                drop(log);
                if emptied {
                    self.turns.remove_if(&participant_id, |_, log| log.is_empty());
                }
            }
        }

        Ok(removed)
    }

    async fn participant_counts(&self) -> Result<Vec<(ParticipantId, u64)>, StoreError> {
        let now = self.clock.now();
        let mut counts: Vec<(ParticipantId, u64)> = self
            .turns
            .iter()
            .map(|entry| {
                let live = entry
                    .value()
                    .iter()
                    .filter(|turn| self.is_live(turn, now))
                    .count() as u64;
                (*entry.key(), live)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(counts)
    }
}
