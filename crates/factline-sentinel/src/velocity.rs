//! Windowed mention counters per claim fingerprint

use factline_domain::traits::{CacheStore, ServiceError};
use factline_domain::Fingerprint;
use factline_store::call_blocking;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "velocity:";

fn key(fingerprint: &Fingerprint) -> String {
    format!("{}{}", KEY_PREFIX, fingerprint)
}

/// Point-in-time view of one fingerprint's counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocitySnapshot {
    /// Claim fingerprint
    pub fingerprint: Fingerprint,
    /// Mentions in the current window; `None` when the cache could not answer
    pub count: Option<u64>,
    /// Unix seconds the current window opened
    pub window_start: Option<u64>,
    /// Count is above the trending threshold
    pub trending: bool,
}

impl VelocitySnapshot {
    fn unknown(fingerprint: &Fingerprint) -> Self {
        Self {
            fingerprint: fingerprint.clone(),
            count: None,
            window_start: None,
            trending: false,
        }
    }

    /// Whether this mention opened a new window
    pub fn is_first_sighting(&self) -> bool {
        matches!(self.count, None | Some(1))
    }
}

/// Mention velocity backed by the cache's atomic counters
///
/// The first increment in a window sets the expiry; later increments in the
/// same window leave it alone. Cache failures never propagate: the count is
/// reported as unknown and ingestion carries on.
pub struct VelocityTracker {
    cache: Arc<dyn CacheStore>,
    window: Duration,
    threshold: u64,
    timeout: Duration,
}

impl VelocityTracker {
    /// Create a tracker over `cache`
    pub fn new(cache: Arc<dyn CacheStore>, window: Duration, threshold: u64, timeout: Duration) -> Self {
        Self {
            cache,
            window,
            threshold,
            timeout,
        }
    }

    /// Trending threshold
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    fn snapshot_from(&self, fingerprint: &Fingerprint, value: u64, expires_at: u64) -> VelocitySnapshot {
        VelocitySnapshot {
            fingerprint: fingerprint.clone(),
            count: Some(value),
            window_start: Some(expires_at.saturating_sub(self.window.as_secs())),
            trending: value > self.threshold,
        }
    }

    /// Count one mention of `fingerprint`
    pub async fn record_mention(&self, fingerprint: &Fingerprint) -> VelocitySnapshot {
        let cache = Arc::clone(&self.cache);
        let (key, window) = (key(fingerprint), self.window);
        match call_blocking(self.timeout, move || cache.incr_with_expiry(&key, window)).await {
            Ok(counter) => {
                debug!("velocity {} = {}", fingerprint, counter.value);
                self.snapshot_from(fingerprint, counter.value, counter.expires_at)
            }
            Err(e) => {
                warn!("velocity update for {} failed, count unknown: {}", fingerprint, e);
                VelocitySnapshot::unknown(fingerprint)
            }
        }
    }

    /// Read the counter without touching it
    ///
    /// An absent or expired counter reads as zero.
    pub async fn snapshot(&self, fingerprint: &Fingerprint) -> VelocitySnapshot {
        let cache = Arc::clone(&self.cache);
        let key = key(fingerprint);
        match call_blocking(self.timeout, move || cache.counter(&key)).await {
            Ok(Some(counter)) => self.snapshot_from(fingerprint, counter.value, counter.expires_at),
            Ok(None) => VelocitySnapshot {
                fingerprint: fingerprint.clone(),
                count: Some(0),
                window_start: None,
                trending: false,
            },
            Err(e) => {
                warn!("velocity read for {} failed: {}", fingerprint, e);
                VelocitySnapshot::unknown(fingerprint)
            }
        }
    }

    /// Fingerprints with at least `min_velocity` mentions, busiest first
    pub async fn trending(&self, min_velocity: u64) -> Result<Vec<(Fingerprint, u64)>, ServiceError> {
        let cache = Arc::clone(&self.cache);
        let mut found = call_blocking(self.timeout, move || {
            let mut found = Vec::new();
            for key in cache.keys_with_prefix(KEY_PREFIX)? {
                let Some(counter) = cache.counter(&key)? else {
                    continue;
                };
                if counter.value >= min_velocity {
                    let hex = key.trim_start_matches(KEY_PREFIX);
                    found.push((Fingerprint::from_hex(hex), counter.value));
                }
            }
            Ok(found)
        })
        .await?;

        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_domain::fingerprint;
    use factline_store::{ManualClock, MemoryCache};

    const WINDOW: Duration = Duration::from_secs(3600);

    fn tracker_at(start: u64) -> (VelocityTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        (VelocityTracker::new(cache, WINDOW, 500, Duration::from_secs(1)), clock)
    }

    #[tokio::test]
    async fn test_501_mentions_trend() {
        let (tracker, _) = tracker_at(10_000);
        let fp = fingerprint("the dam has failed");

        let mut last = VelocitySnapshot::unknown(&fp);
        for _ in 0..501 {
            last = tracker.record_mention(&fp).await;
        }
        assert_eq!(last.count, Some(501));
        assert!(last.trending);
        assert_eq!(last.window_start, Some(10_000));
    }

    #[tokio::test]
    async fn test_threshold_is_exclusive() {
        let (tracker, _) = tracker_at(0);
        let fp = fingerprint("claim");
        for _ in 0..499 {
            tracker.record_mention(&fp).await;
        }
        let at_threshold = tracker.record_mention(&fp).await;
        assert_eq!(at_threshold.count, Some(500));
        assert!(!at_threshold.trending);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let (tracker, clock) = tracker_at(1_000);
        let fp = fingerprint("claim");
        for _ in 0..3 {
            tracker.record_mention(&fp).await;
        }
        // later mentions do not extend the window
        clock.advance(Duration::from_secs(3_000));
        assert_eq!(tracker.record_mention(&fp).await.count, Some(4));

        clock.advance(Duration::from_secs(600));
        let fresh = tracker.record_mention(&fp).await;
        assert_eq!(fresh.count, Some(1));
        assert!(fresh.is_first_sighting());
        assert_eq!(fresh.window_start, Some(4_600));
    }

    #[tokio::test]
    async fn test_snapshot_does_not_mutate() {
        let (tracker, _) = tracker_at(0);
        let fp = fingerprint("claim");
        assert_eq!(tracker.snapshot(&fp).await.count, Some(0));

        tracker.record_mention(&fp).await;
        tracker.record_mention(&fp).await;
        for _ in 0..3 {
            assert_eq!(tracker.snapshot(&fp).await.count, Some(2));
        }
    }

    #[tokio::test]
    async fn test_trending_sorted_busiest_first() {
        let (tracker, _) = tracker_at(0);
        let (a, b, c) = (fingerprint("a"), fingerprint("b"), fingerprint("c"));
        for (fp, n) in [(&a, 2), (&b, 5), (&c, 1)] {
            for _ in 0..n {
                tracker.record_mention(fp).await;
            }
        }

        let found = tracker.trending(2).await.unwrap();
        assert_eq!(found, vec![(b, 5), (a, 2)]);
    }
}
