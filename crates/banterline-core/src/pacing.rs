//! Reply pacing.
//!
//! A reply that lands instantly reads as mechanical. The transport
//! sleeps for a length-proportional delay before delivering, clamped so
//! short quips still feel quick and long rants do not stall the stream.

use std::time::Duration;

/// Seconds of simulated typing per character of reply.
const SECS_PER_CHAR: f64 = 0.06;

const MIN_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(12);

/// How long to pretend to type before delivering `reply`.
pub fn reply_delay(reply: &str) -> Duration {
    let raw = Duration::from_secs_f64(reply.chars().count() as f64 * SECS_PER_CHAR);
    raw.clamp(MIN_DELAY, MAX_DELAY)
}
