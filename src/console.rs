use crate::event::{EventId, RemoteEvent};
use crate::sink::EventSink;
use serde::Serialize;
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Sink that writes each event as one JSON line.
///
/// Handy during development, or behind a log shipper that tails stdout.
/// Events are written synchronously, so `flush` only has to flush the
/// underlying writer and never waits on anything else.
pub struct ConsoleSink<W = Stdout> {
    writer: Mutex<W>,
}

#[derive(Serialize)]
struct ConsoleLine<'a> {
    event_id: EventId,
    #[serde(flatten)]
    event: &'a RemoteEvent,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give back the writer, e.g. to inspect a `Vec<u8>` in tests.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> EventSink for ConsoleSink<W> {
    fn capture_event(&self, event: RemoteEvent) -> Option<EventId> {
        let event_id = EventId::new();
        let line = serde_json::to_string(&ConsoleLine {
            event_id,
            event: &event,
        })
        .ok()?;

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line).ok()?;
        Some(event_id)
    }

    fn flush(&self, _timeout: Duration) -> bool {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush().is_ok()
    }
}
