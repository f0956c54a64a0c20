use crate::adapter::EventAdapter;
use crate::error::Error;
use crate::record::{Field, FieldValue, LogRecord, Severity};
use chrono::Utc;
use std::borrow::Cow;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// forwards them through an [`EventAdapter`].
///
/// Span fields are attached as accumulated context: for every event the
/// fields of its enclosing spans, root first, are added with
/// [`EventAdapter::derive_with`] before the event's own fields. Admission
/// is decided by the adapter's level filter, not by this layer, so other
/// layers in the same subscriber still see every event.
pub struct EventAdapterLayer {
    adapter: EventAdapter,
    id: u64,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events the sink accepted.
    pub captured_events: Arc<AtomicU64>,
    /// Events the sink refused.
    pub failed_events: Arc<AtomicU64>,
}

/// Span extension holding the fields recorded on a span.
///
/// One registry may carry several adapter layers; they share this
/// extension and only the layer that created it (`owner`) writes to it.
struct SpanFields {
    owner: u64,
    fields: Vec<Field>,
}

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(0);

fn visit_span_values(values: &Record<'_>) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut message = None;
    values.record(&mut FieldVisitor { fields: &mut fields, message: &mut message });
    if let Some(message) = message {
        fields.push(Field::new("message", message));
    }
    fields
}

impl EventAdapterLayer {
    pub fn new(adapter: EventAdapter) -> Self {
        Self {
            adapter,
            id: NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed),
            total_events: Arc::new(AtomicU64::new(0)),
            captured_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn adapter(&self) -> &EventAdapter {
        &self.adapter
    }

    /// Flush the adapter's sink. See [`EventAdapter::flush`].
    pub fn flush(&self) -> Result<(), Error> {
        self.adapter.flush()
    }
}

/// Events emitted from inside this crate are never captured.
fn is_own_target(target: &str) -> bool {
    const CRATE: &str = env!("CARGO_CRATE_NAME");
    match target.strip_prefix(CRATE) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

impl<S> Layer<S> for EventAdapterLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut extensions = span.extensions_mut();
        if extensions.get_mut::<SpanFields>().is_some() {
            return;
        }

        let fields = visit_span_values(&Record::new(attrs.values()));
        extensions.insert(SpanFields { owner: self.id, fields });
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut extensions = span.extensions_mut();
        if let Some(existing) = extensions.get_mut::<SpanFields>() {
            if existing.owner == self.id {
                existing.fields.extend(visit_span_values(values));
            }
            return;
        }

        extensions.insert(SpanFields {
            owner: self.id,
            fields: visit_span_values(values),
        });
    }

    fn on_event(&self, event: &Event, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }

        let level = Severity::from(*meta.level());
        if !self.adapter.admits_level(level) {
            return;
        }

        let mut context = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(stored) = span.extensions().get::<SpanFields>() {
                    context.extend(stored.fields.iter().cloned());
                }
            }
        }

        let adapter = if context.is_empty() {
            Cow::Borrowed(&self.adapter)
        } else {
            Cow::Owned(self.adapter.derive_with(context))
        };

        let mut fields = Vec::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor { fields: &mut fields, message: &mut message });

        let record = LogRecord {
            level,
            message: message.unwrap_or_default(),
            timestamp: Utc::now(),
            logger_name: meta.target().to_string(),
        };

        match adapter.emit(&record, &fields) {
            Ok(()) => {
                self.captured_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("event adapter dropped log record: {}", e);
            }
        }
    }
}

use tracing::field::{Field as TracingField, Visit};

/// Collects `tracing` field values into [`Field`]s, pulling the
/// `message` field out separately.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Field>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn push(&mut self, field: &TracingField, value: impl Into<FieldValue>) {
        self.fields.push(Field::new(field.name(), value));
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, value);
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, value);
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, value);
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, value);
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, value);
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, format!("{:?}", value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_own_target;

    #[test]
    fn own_target_matches_whole_crate_path() {
        assert!(is_own_target("tracing_event_adapter"));
        assert!(is_own_target("tracing_event_adapter::init"));
        assert!(!is_own_target("tracing_event_adapter_ext"));
        assert!(!is_own_target("tracing_event_adapter_ext::worker"));
        assert!(!is_own_target("app"));
    }
}
