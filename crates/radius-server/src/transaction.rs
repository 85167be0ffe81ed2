//! Duplicate request detection
//!
//! A transaction is identified by the request's source address, source port
//! and RADIUS identifier. A key that was acquired within the duplicate
//! window is treated as a retransmission and rejected. Entries outlive the
//! request they belong to: `release` only schedules removal for when the
//! window closes, and a periodic sweep removes entries that were never
//! released.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

/// Default duplicate window (30 seconds)
pub const DEFAULT_DUPLICATE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default sweep interval (5 minutes)
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub address: IpAddr,
    pub port: u16,
    pub identifier: u8,
}

impl TransactionKey {
    pub fn new(source: SocketAddr, identifier: u8) -> Self {
        TransactionKey {
            address: source.ip(),
            port: source.port(),
            identifier,
        }
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", SocketAddr::new(self.address, self.port), self.identifier)
    }
}

/// Duplicate-request tracker
#[async_trait]
pub trait RadiusTransaction: Send + Sync {
    /// `true` if the key is new (or its window has passed), `false` for a duplicate
    async fn acquire(&self, key: TransactionKey) -> bool;

    /// Processing of `key` has finished
    async fn release(&self, key: TransactionKey);

    /// Stop background work and forget all entries
    async fn dispose(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionConfig {
    pub duplicate_timeout: Duration,
    pub cleanup_interval: Duration,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        TransactionConfig {
            duplicate_timeout: DEFAULT_DUPLICATE_TIMEOUT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

/// In-process tracker over a concurrent map
///
/// Must be created inside a tokio runtime; the sweep runs as a spawned task
/// until [`RadiusTransaction::dispose`] is called or the tracker is dropped.
pub struct MemoryRadiusTransaction {
    entries: Arc<DashMap<TransactionKey, Instant>>,
    duplicate_timeout: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryRadiusTransaction {
    pub fn new(config: TransactionConfig) -> Self {
        let entries = Arc::new(DashMap::new());
        let sweeper = Self::spawn_sweeper(
            Arc::clone(&entries),
            config.duplicate_timeout,
            config.cleanup_interval,
        );

        MemoryRadiusTransaction {
            entries,
            duplicate_timeout: config.duplicate_timeout,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    fn spawn_sweeper(
        entries: Arc<DashMap<TransactionKey, Instant>>,
        duplicate_timeout: Duration,
        cleanup_interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval(cleanup_interval);
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let now = Instant::now();
                let before = entries.len();
                entries.retain(|_, acquired| now.duration_since(*acquired) <= duplicate_timeout);
                let removed = before.saturating_sub(entries.len());

                if removed > 0 {
                    debug!(
                        removed = removed,
                        remaining = entries.len(),
                        "Transaction sweep completed"
                    );
                }
            }
        })
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &TransactionKey) -> bool {
        self.entries.contains_key(key)
    }

    fn stop_sweeper(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Default for MemoryRadiusTransaction {
    fn default() -> Self {
        Self::new(TransactionConfig::default())
    }
}

#[async_trait]
impl RadiusTransaction for MemoryRadiusTransaction {
    async fn acquire(&self, key: TransactionKey) -> bool {
        let now = Instant::now();
        // Check and set under the map's shard lock
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) <= self.duplicate_timeout {
                    false
                } else {
                    entry.insert(now);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    async fn release(&self, key: TransactionKey) {
        let Some(acquired) = self.entries.get(&key).map(|entry| *entry) else {
            return;
        };

        let remaining = self.duplicate_timeout.saturating_sub(acquired.elapsed());
        if remaining.is_zero() {
            self.entries.remove_if(&key, |_, seen| *seen == acquired);
            return;
        }

        let entries = Arc::clone(&self.entries);
        tokio::spawn(async move {
            time::sleep(remaining).await;
            // A newer acquisition of the same key keeps its entry
            entries.remove_if(&key, |_, seen| *seen == acquired);
        });
    }

    async fn dispose(&self) {
        self.stop_sweeper();
        self.entries.clear();
        debug!("Transaction tracker disposed");
    }
}

impl Drop for MemoryRadiusTransaction {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(identifier: u8) -> TransactionKey {
        TransactionKey::new("192.168.1.10:40000".parse().unwrap(), identifier)
    }

    fn tracker(duplicate_timeout: Duration) -> MemoryRadiusTransaction {
        MemoryRadiusTransaction::new(TransactionConfig {
            duplicate_timeout,
            cleanup_interval: Duration::from_secs(3600),
        })
    }

    #[test]
    fn test_key_identity() {
        let a = TransactionKey::new("10.0.0.1:1000".parse().unwrap(), 1);
        assert_eq!(a, TransactionKey::new("10.0.0.1:1000".parse().unwrap(), 1));
        assert_ne!(a, TransactionKey::new("10.0.0.1:1001".parse().unwrap(), 1));
        assert_ne!(a, TransactionKey::new("10.0.0.2:1000".parse().unwrap(), 1));
        assert_ne!(a, TransactionKey::new("10.0.0.1:1000".parse().unwrap(), 2));
        assert_eq!(a.to_string(), "10.0.0.1:1000#1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_within_window() {
        let tracker = tracker(Duration::from_secs(30));

        assert!(tracker.acquire(key(1)).await);
        assert!(!tracker.acquire(key(1)).await);
        assert!(tracker.acquire(key(2)).await);

        time::sleep(Duration::from_secs(31)).await;
        assert!(tracker.acquire(key(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_acquire_does_not_refresh() {
        let tracker = tracker(Duration::from_secs(30));

        assert!(tracker.acquire(key(1)).await);
        time::sleep(Duration::from_secs(20)).await;
        assert!(!tracker.acquire(key(1)).await);
        // 31s after the first acquisition, 11s after the rejected one
        time::sleep(Duration::from_secs(11)).await;
        assert!(tracker.acquire(key(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_keeps_residual_window() {
        let tracker = tracker(Duration::from_secs(30));

        assert!(tracker.acquire(key(1)).await);
        time::sleep(Duration::from_secs(5)).await;
        tracker.release(key(1)).await;

        // Late retransmission after processing finished
        time::sleep(Duration::from_secs(10)).await;
        assert!(!tracker.acquire(key(1)).await);
        assert!(tracker.contains(&key(1)));

        time::sleep(Duration::from_secs(16)).await;
        assert!(!tracker.contains(&key(1)));
        assert!(tracker.acquire(key(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_release_timer_spares_new_acquisition() {
        let tracker = tracker(Duration::from_secs(10));

        assert!(tracker.acquire(key(1)).await);
        tracker.release(key(1)).await;
        time::sleep(Duration::from_secs(5)).await;

        // Entry ages out before its removal timer fires and the key is
        // acquired again
        tracker
            .entries
            .insert(key(1), Instant::now() - Duration::from_secs(11));
        assert!(tracker.acquire(key(1)).await);

        // Past the first timer's deadline
        time::sleep(Duration::from_secs(6)).await;
        assert!(tracker.contains(&key(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_of_unknown_key_is_noop() {
        let tracker = tracker(Duration::from_secs(10));
        tracker.release(key(9)).await;
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_unreleased_entries() {
        let tracker = MemoryRadiusTransaction::new(TransactionConfig {
            duplicate_timeout: Duration::from_secs(10),
            cleanup_interval: Duration::from_secs(15),
        });

        assert!(tracker.acquire(key(1)).await);
        assert!(tracker.acquire(key(2)).await);
        assert_eq!(tracker.len(), 2);

        time::sleep(Duration::from_secs(16)).await;
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_clears_and_is_idempotent() {
        let tracker = tracker(Duration::from_secs(30));
        assert!(tracker.acquire(key(1)).await);

        tracker.dispose().await;
        assert!(tracker.is_empty());
        tracker.dispose().await;

        assert!(tracker.acquire(key(1)).await);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_admits_one() {
        let tracker = Arc::new(tracker(Duration::from_secs(30)));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move { tracker.acquire(key(7)).await }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
