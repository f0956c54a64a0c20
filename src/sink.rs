use crate::event::{EventId, RemoteEvent};
use std::time::Duration;

/// Destination for [`RemoteEvent`]s produced by the adapter.
///
/// Implementations are responsible for transporting events to a concrete
/// error-tracking service (or a file, stdout, an in-memory buffer). The
/// adapter calls `capture_event` on the logging thread, so implementations
/// should hand the event off quickly and do any slow I/O elsewhere.
pub trait EventSink: Send + Sync {
    /// Accept a single event.
    ///
    /// **Parameters**
    /// - `event`: fully-populated [`RemoteEvent`] built by the adapter.
    ///
    /// **Returns**
    /// - `Some(id)` if the event was accepted.
    /// - `None` if there is no client or scope able to take it. The adapter
    ///   reports this as [`Error::ClientUnavailable`](crate::error::Error).
    fn capture_event(&self, event: RemoteEvent) -> Option<EventId>;

    /// Block until buffered events are delivered or `timeout` elapses.
    ///
    /// **Returns**
    /// - `true` if everything was delivered in time.
    /// - `false` if the timeout elapsed first.
    ///
    /// Default implementation has nothing buffered and returns `true`.
    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}
