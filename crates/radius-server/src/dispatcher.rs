//! Bounded-concurrency packet dispatch
//!
//! Wraps a [`PacketHandler`] so that at most `concurrency` packets are
//! handled at once. Further packets wait in FIFO order for a slot. Once
//! disposal starts, new packets are discarded and in-flight ones are given
//! a bounded time to finish.

use crate::handler::PacketHandler;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// Default drain timeout on dispose (10 seconds)
pub const DEFAULT_DISPOSE_TIMEOUT: Duration = Duration::from_secs(10);
/// How often the drain checks for outstanding packets
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Decrements the outstanding counter however the handling future ends
struct Outstanding<'a>(&'a AtomicUsize);

impl<'a> Outstanding<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Outstanding(counter)
    }
}

impl Drop for Outstanding<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ConcurrentPacketHandler {
    delegate: Arc<dyn PacketHandler>,
    permits: Semaphore,
    concurrency: usize,
    /// Running plus queued
    outstanding: AtomicUsize,
    disposing: AtomicBool,
    dispose_timeout: Duration,
}

impl ConcurrentPacketHandler {
    /// `concurrency` is clamped to at least 1
    pub fn new(delegate: Arc<dyn PacketHandler>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        ConcurrentPacketHandler {
            delegate,
            permits: Semaphore::new(concurrency),
            concurrency,
            outstanding: AtomicUsize::new(0),
            disposing: AtomicBool::new(false),
            dispose_timeout: DEFAULT_DISPOSE_TIMEOUT,
        }
    }

    /// Drain timeout used by [`PacketHandler::dispose`]
    pub fn with_dispose_timeout(mut self, timeout: Duration) -> Self {
        self.dispose_timeout = timeout;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Packets currently holding a slot
    pub fn running(&self) -> usize {
        self.concurrency - self.permits.available_permits()
    }

    /// Packets running or waiting for a slot
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn is_disposing(&self) -> bool {
        self.disposing.load(Ordering::SeqCst)
    }

    /// Stop admitting packets, wait up to `timeout` for outstanding ones,
    /// then dispose the delegate
    ///
    /// Packets still running after the timeout are left to finish on their own.
    pub async fn dispose_with_timeout(&self, timeout: Duration) {
        if self.disposing.swap(true, Ordering::SeqCst) {
            debug!("Dispatcher already disposed");
            return;
        }

        let deadline = Instant::now() + timeout;
        loop {
            let outstanding = self.outstanding();
            if outstanding == 0 {
                break;
            }
            if Instant::now() >= deadline {
                warn!(
                    outstanding = outstanding,
                    timeout_ms = timeout.as_millis() as u64,
                    "Timed out waiting for in-flight packets"
                );
                break;
            }
            time::sleep(DRAIN_POLL_INTERVAL).await;
        }

        self.delegate.dispose().await;
    }
}

#[async_trait]
impl PacketHandler for ConcurrentPacketHandler {
    async fn handle(&self, data: Vec<u8>, remote: SocketAddr) -> Option<Vec<u8>> {
        // Counted before the flag is read: a drain that sets the flag then
        // sees zero outstanding can no longer race with an admitted packet
        let _outstanding = Outstanding::enter(&self.outstanding);
        if self.is_disposing() {
            debug!(client_addr = %remote, "Dispatcher disposing, discarding packet");
            return None;
        }

        // Semaphore waiters are served in FIFO order
        let _permit = self.permits.acquire().await.ok()?;
        self.delegate.handle(data, remote).await
    }

    async fn dispose(&self) {
        self.dispose_with_timeout(self.dispose_timeout).await;
    }
}
