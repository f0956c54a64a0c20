use crate::event::{EventId, RemoteEvent};
use crate::sink::EventSink;

/// A sink with no client behind it.
///
/// Every event is dropped and reported as not captured, the same way an
/// unbound remote client behaves. Useful for measuring the overhead of
/// the layer itself without any I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn capture_event(&self, _event: RemoteEvent) -> Option<EventId> {
        None
    }
}
