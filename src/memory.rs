use crate::event::{EventId, RemoteEvent};
use crate::sink::EventSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A sink that keeps every captured event in memory.
///
/// Useful for tests and for inspecting what the adapter produces without
/// any external service. It can also pretend the remote client is gone
/// (`set_unavailable`) or that a flush never completes
/// (`set_flush_stalled`).
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RemoteEvent>>,
    unavailable: AtomicBool,
    flush_stalled: AtomicBool,
    last_flush_timeout: Mutex<Option<Duration>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_flush_stalled(&self, stalled: bool) {
        self.flush_stalled.store(stalled, Ordering::SeqCst);
    }

    /// Snapshot of the captured events, oldest first.
    pub fn events(&self) -> Vec<RemoteEvent> {
        lock(&self.events).clone()
    }

    /// Drain the captured events.
    pub fn take(&self) -> Vec<RemoteEvent> {
        std::mem::take(&mut *lock(&self.events))
    }

    /// Timeout passed to the most recent `flush` call.
    pub fn last_flush_timeout(&self) -> Option<Duration> {
        *lock(&self.last_flush_timeout)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventSink for MemorySink {
    fn capture_event(&self, event: RemoteEvent) -> Option<EventId> {
        if self.unavailable.load(Ordering::SeqCst) {
            return None;
        }
        lock(&self.events).push(event);
        Some(EventId::new())
    }

    fn flush(&self, timeout: Duration) -> bool {
        *lock(&self.last_flush_timeout) = Some(timeout);
        !self.flush_stalled.load(Ordering::SeqCst)
    }
}
