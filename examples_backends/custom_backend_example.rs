use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span};
use tracing_event_adapter::{
    init::init_tracing,
    EventId, EventSink, RemoteEvent,
};

/// Example of integrating a completely custom backend by implementing
/// the `EventSink` trait directly. Imagine this talks to some
/// proprietary error tracker for which this crate does not provide a
/// built-in sink.
struct MyErrorTrackerSink;

impl EventSink for MyErrorTrackerSink {
    fn capture_event(&self, event: RemoteEvent) -> Option<EventId> {
        // Here you would call your own client library for the tracker.
        // For the sake of example we just print the event.
        println!("[my-error-tracker] {:?}", event);
        Some(EventId::new())
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink: Arc<dyn EventSink> = Arc::new(MyErrorTrackerSink);

    let adapter = init_tracing(sink)?;

    info!("custom backend example started");
    let span = info_span!("checkout", "#tenant" = "acme", cart_items = 3u64);
    let _guard = span.enter();
    error!("#env" = "dev", "simulated error sent via custom backend");

    adapter.flush()?;
    Ok(())
}
