//! Fan-out of console output to live viewers with a bounded backlog.

use crate::Metrics;

use gsm_core::LogLine;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Keeps the last `ring_capacity` lines and pushes new lines to every subscriber.
///
/// Each subscriber reads from its own bounded window of `subscriber_buffer`
/// lines. A subscriber that falls further behind loses its oldest unread lines
/// and the loss is counted; the producer never waits.
#[derive(Clone)]
pub struct LogBroadcaster {
    inner: Arc<BroadcasterInner>,
}

struct BroadcasterInner {
    ring: Mutex<VecDeque<LogLine>>,
    ring_capacity: usize,
    sender: broadcast::Sender<LogLine>,
    subscriber_count: AtomicUsize,
    dropped_lines: AtomicU64,
    metrics: Metrics,
}

impl LogBroadcaster {
    pub fn new(ring_capacity: usize, subscriber_buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(subscriber_buffer.max(1));

        Self {
            inner: Arc::new(BroadcasterInner {
                ring: Mutex::new(VecDeque::with_capacity(ring_capacity.max(1))),
                ring_capacity: ring_capacity.max(1),
                sender,
                subscriber_count: AtomicUsize::new(0),
                dropped_lines: AtomicU64::new(0),
                metrics: Metrics::new(),
            }),
        }
    }

    /// Append to the backlog and hand the line to every live subscriber. Never blocks on consumers.
    pub fn publish(&self, line: LogLine) {
        let mut ring = self.inner.lock_ring();

        if ring.len() == self.inner.ring_capacity {
            ring.pop_front();
        }
        ring.push_back(line.clone());

        // Sending under the ring lock keeps subscribe()'s snapshot and its live stream disjoint.
        let _ = self.inner.sender.send(line);
        self.inner.metrics.line_published();
    }

    /// Point-in-time backlog plus a receiver for every line published afterwards.
    pub fn subscribe(&self) -> (Vec<LogLine>, LogReceiver) {
        let ring = self.inner.lock_ring();
        let backlog: Vec<LogLine> = ring.iter().cloned().collect();
        let receiver = self.inner.sender.subscribe();
        drop(ring);

        let count = self.inner.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.metrics.subscribers(count);
        log::debug!("Log subscriber joined ({} total)", count);

        (
            backlog,
            LogReceiver {
                receiver: Some(receiver),
                inner: Arc::clone(&self.inner),
                dropped: 0,
            },
        )
    }

    /// Same as [`LogReceiver::unsubscribe`]; safe to call more than once.
    pub fn unsubscribe(&self, receiver: &mut LogReceiver) {
        receiver.unsubscribe();
    }

    pub fn backlog(&self) -> Vec<LogLine> {
        self.inner.lock_ring().iter().cloned().collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count.load(Ordering::SeqCst)
    }

    /// Lines lost across all subscribers since startup.
    pub fn dropped_lines(&self) -> u64 {
        self.inner.dropped_lines.load(Ordering::SeqCst)
    }
}

impl BroadcasterInner {
    fn lock_ring(&self) -> MutexGuard<'_, VecDeque<LogLine>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_dropped(&self, count: u64) {
        self.dropped_lines.fetch_add(count, Ordering::SeqCst);
        self.metrics.lines_dropped(count);
    }
}

/// Live side of a subscription. Dropping it unsubscribes.
pub struct LogReceiver {
    receiver: Option<broadcast::Receiver<LogLine>>,
    inner: Arc<BroadcasterInner>,
    dropped: u64,
}

impl LogReceiver {
    /// Next live line, or `None` once unsubscribed or the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<LogLine> {
        loop {
            let result = self.receiver.as_mut()?.recv().await;
            match result {
                Ok(line) => return Some(line),
                Err(RecvError::Lagged(missed)) => self.lagged(missed),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<LogLine> {
        loop {
            let result = self.receiver.as_mut()?.try_recv();
            match result {
                Ok(line) => return Some(line),
                Err(TryRecvError::Lagged(missed)) => self.lagged(missed),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Lines this subscriber lost because it fell behind.
    pub fn dropped_lines(&self) -> u64 {
        self.dropped
    }

    pub fn is_subscribed(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if self.receiver.take().is_some() {
            let previous = self.inner.subscriber_count.fetch_sub(1, Ordering::SeqCst);
            let remaining = previous.saturating_sub(1);
            self.inner.metrics.subscribers(remaining);
            log::debug!("Log subscriber left ({} remaining)", remaining);
        }
    }

    fn lagged(&mut self, missed: u64) {
        self.dropped += missed;
        self.inner.record_dropped(missed);
        log::debug!("Log subscriber lagged, dropped {} lines", missed);
    }
}

impl Drop for LogReceiver {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
