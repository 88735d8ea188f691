//! Participant identifiers.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Opaque stable identifier for one chat participant.
///
/// Chat platforms hand out numeric account IDs; the core never
/// inspects the value beyond equality and hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(ParticipantId)
            .map_err(|e| format!("invalid participant id '{s}': {e}"))
    }
}

impl From<u64> for ParticipantId {
    fn from(value: u64) -> Self {
        ParticipantId(value)
    }
}
