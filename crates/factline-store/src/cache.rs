//! In-memory cache store
//!
//! `MemoryCache` implements `CacheStore`: string values with optional TTL,
//! windowed counters, FIFO queues and broadcast channels. All state sits
//! behind one mutex, so every trait call is a single atomic round trip.
//!
//! Time comes from a `Clock`, which lets tests move TTLs and velocity
//! windows forward without sleeping.
//!
//! Expired values and counters are swept on write, at most once per
//! [`SWEEP_INTERVAL_SECS`] of clock time.

use crate::StoreError;
use factline_domain::now_secs;
use factline_domain::traits::{CacheStore, Counter, ServiceError};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Minimum clock time between two sweeps of expired entries
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Source of the current time in unix seconds
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        now_secs()
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Clock starting at `start`
    pub fn new(start: u64) -> Self {
        Self { now: AtomicU64::new(start) }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_secs(), Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, to: u64) {
        self.now.store(to, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

struct Entry {
    value: String,
    expires_at: Option<u64>,
}

impl Entry {
    fn live(&self, now: u64) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Default)]
struct CacheState {
    values: HashMap<String, Entry>,
    counters: HashMap<String, Counter>,
    queues: HashMap<String, VecDeque<String>>,
    channels: HashMap<String, broadcast::Sender<String>>,
    last_sweep: Option<u64>,
}

impl CacheState {
    fn sweep_expired(&mut self, now: u64) {
        if self
            .last_sweep
            .is_some_and(|at| now < at.saturating_add(SWEEP_INTERVAL_SECS))
        {
            return;
        }
        self.values.retain(|_, e| e.live(now));
        self.counters.retain(|_, c| now < c.expires_at);
        self.last_sweep = Some(now);
    }
}

/// Process-local `CacheStore`
pub struct MemoryCache {
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Cache on the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Cache on a caller-supplied clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, CacheState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Subscribe to a channel; messages published afterwards are delivered
    pub fn subscribe(&self, channel: &str) -> Result<broadcast::Receiver<String>, StoreError> {
        let mut state = self.state()?;
        let sender = state
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }

    /// Current length of a queue
    pub fn queue_len(&self, queue: &str) -> Result<usize, StoreError> {
        Ok(self.state()?.queues.get(queue).map_or(0, VecDeque::len))
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state()?;
        let found = state.values.get(key).map(|e| (e.live(now), e.value.clone()));
        match found {
            Some((true, value)) => Ok(Some(value)),
            Some((false, _)) => {
                state.values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), ServiceError> {
        let now = self.clock.now();
        let mut state = self.state()?;
        state.sweep_expired(now);
        state.values.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|t| now.saturating_add(t.as_secs())),
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, ServiceError> {
        let mut state = self.state()?;
        let had_value = state.values.remove(key).is_some();
        let had_counter = state.counters.remove(key).is_some();
        Ok(had_value || had_counter)
    }

    fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<Counter, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state()?;
        state.sweep_expired(now);
        let counter = state
            .counters
            .entry(key.to_string())
            .and_modify(|c| {
                if now >= c.expires_at {
                    *c = Counter { value: 0, expires_at: now.saturating_add(window.as_secs()) };
                }
            })
            .or_insert(Counter { value: 0, expires_at: now.saturating_add(window.as_secs()) });
        counter.value += 1;
        Ok(*counter)
    }

    fn counter(&self, key: &str) -> Result<Option<Counter>, ServiceError> {
        let now = self.clock.now();
        let state = self.state()?;
        Ok(state.counters.get(key).filter(|c| now < c.expires_at).copied())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let now = self.clock.now();
        let mut state = self.state()?;
        state.values.retain(|_, e| e.live(now));
        state.counters.retain(|_, c| now < c.expires_at);

        let keys: BTreeSet<String> = state
            .values
            .keys()
            .chain(state.counters.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(keys.into_iter().collect())
    }

    fn push(&self, queue: &str, item: &str) -> Result<usize, ServiceError> {
        let mut state = self.state()?;
        let q = state.queues.entry(queue.to_string()).or_default();
        q.push_back(item.to_string());
        Ok(q.len())
    }

    fn pop(&self, queue: &str) -> Result<Option<String>, ServiceError> {
        let mut state = self.state()?;
        Ok(state.queues.get_mut(queue).and_then(VecDeque::pop_front))
    }

    fn publish(&self, channel: &str, message: &str) -> Result<usize, ServiceError> {
        let state = self.state()?;
        // No subscribers (or none ever registered) is not an error
        Ok(state
            .channels
            .get(channel)
            .and_then(|tx| tx.send(message.to_string()).ok())
            .unwrap_or(0))
    }
}
