use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix seconds
///
/// A clock set before the epoch reads as 0.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
