use crate::error::Error;
use crate::event::RemoteEvent;
use crate::level::{map_level, LevelFilter};
use crate::record::{Field, FieldValue, LogRecord, Severity};
use crate::sink::EventSink;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Prefix marking a field as a tag. Every other field becomes `extra`.
pub const DEFAULT_TAG_PREFIX: &str = "#";

/// Upper bound for a blocking [`EventAdapter::flush`].
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns log records into [`RemoteEvent`]s and hands them to an
/// [`EventSink`].
///
/// An adapter is immutable once built. [`derive_with`](Self::derive_with)
/// returns a new adapter sharing the filter and sink but owning its own
/// copy of the accumulated fields, so one instance can be shared across
/// threads and scopes without locking.
#[derive(Clone)]
pub struct EventAdapter {
    filter: Arc<dyn LevelFilter>,
    sink: Arc<dyn EventSink>,
    fields: Vec<Field>,
    tag_prefix: String,
}

impl EventAdapter {
    /// Create an adapter with no accumulated context and the default
    /// tag prefix.
    ///
    /// **Parameters**
    /// - `sink`: where built events are captured.
    /// - `filter`: admission predicate, e.g. a minimum [`Severity`].
    pub fn new(sink: Arc<dyn EventSink>, filter: impl LevelFilter + 'static) -> Self {
        Self {
            filter: Arc::new(filter),
            sink,
            fields: Vec::new(),
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }

    /// Like [`new`](Self::new), with `fields` as the initial context.
    pub fn new_with_fields(
        sink: Arc<dyn EventSink>,
        filter: impl LevelFilter + 'static,
        fields: impl IntoIterator<Item = Field>,
    ) -> Self {
        let mut adapter = Self::new(sink, filter);
        adapter.fields = fields.into_iter().collect();
        adapter
    }

    /// Replace the tag prefix. An empty prefix falls back to
    /// [`DEFAULT_TAG_PREFIX`] when events are built.
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    /// Context accumulated through [`derive_with`](Self::derive_with).
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Return a new adapter whose context is this adapter's fields
    /// followed by `fields`. `self` is left untouched.
    pub fn derive_with(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let fields = fields.into_iter();
        let mut merged = Vec::with_capacity(self.fields.len() + fields.size_hint().0);
        merged.extend(self.fields.iter().cloned());
        merged.extend(fields);

        Self {
            filter: Arc::clone(&self.filter),
            sink: Arc::clone(&self.sink),
            fields: merged,
            tag_prefix: self.tag_prefix.clone(),
        }
    }

    pub fn admits_level(&self, level: Severity) -> bool {
        self.filter.enabled(level)
    }

    /// Whether [`emit`](Self::emit) should run for `record`. Callers check
    /// this first; `emit` itself does not filter.
    pub fn admits(&self, record: &LogRecord) -> bool {
        self.admits_level(record.level)
    }

    fn active_prefix(&self) -> &str {
        if self.tag_prefix.is_empty() {
            DEFAULT_TAG_PREFIX
        } else {
            &self.tag_prefix
        }
    }

    /// Build the event for `record` without sending it.
    ///
    /// Accumulated fields come first, then `fields`; on duplicate keys the
    /// later one wins. Keys starting with the active prefix become tags
    /// (first character dropped, value as text), the rest go to `extra`
    /// with their original type.
    pub fn build_event(&self, record: &LogRecord, fields: &[Field]) -> RemoteEvent {
        let mut flattened: BTreeMap<&str, &FieldValue> = BTreeMap::new();
        for field in self.fields.iter().chain(fields) {
            flattened.insert(field.key.as_str(), &field.value);
        }

        let prefix = self.active_prefix();
        let mut tags = BTreeMap::new();
        let mut extra = BTreeMap::new();

        for (key, value) in flattened {
            if key.starts_with(prefix) {
                // Only the first character is stripped, even for longer prefixes.
                let mut chars = key.chars();
                chars.next();
                let tag_value = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_text(),
                };
                tags.insert(chars.as_str().to_string(), tag_value);
                continue;
            }
            extra.insert(key.to_string(), value.to_json());
        }

        RemoteEvent {
            message: record.message.clone(),
            timestamp: record.timestamp,
            level: map_level(record.level),
            logger: record.logger_name.clone(),
            tags: (!tags.is_empty()).then_some(tags),
            extra: (!extra.is_empty()).then_some(extra),
        }
    }

    /// Build the event for `record` and capture it.
    ///
    /// **Returns**
    /// - `Ok(())` once the sink hands back an identifier.
    /// - `Err(Error::ClientUnavailable)` if it does not.
    pub fn emit(&self, record: &LogRecord, fields: &[Field]) -> Result<(), Error> {
        let event = self.build_event(record, fields);
        match self.sink.capture_event(event) {
            Some(_) => Ok(()),
            None => Err(Error::ClientUnavailable),
        }
    }

    /// Block until the sink drains, for at most [`FLUSH_TIMEOUT`].
    pub fn flush(&self) -> Result<(), Error> {
        if self.sink.flush(FLUSH_TIMEOUT) {
            Ok(())
        } else {
            Err(Error::FlushTimeout)
        }
    }
}

impl std::fmt::Debug for EventAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAdapter")
            .field("fields", &self.fields)
            .field("tag_prefix", &self.tag_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLevel;
    use crate::memory::MemorySink;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn adapter(sink: &Arc<MemorySink>) -> EventAdapter {
        EventAdapter::new(sink.clone(), Severity::Debug)
    }

    fn record() -> LogRecord {
        LogRecord::new(Severity::Error, "disk full").with_logger("storage")
    }

    #[test]
    fn splits_tags_from_extra() {
        let sink = Arc::new(MemorySink::new());
        let event = adapter(&sink).build_event(
            &record(),
            &[Field::new("#env", "prod"), Field::new("count", 3i64)],
        );

        assert_eq!(
            event.tags,
            Some(BTreeMap::from([("env".to_string(), "prod".to_string())]))
        );
        assert_eq!(event.extra, Some(BTreeMap::from([("count".to_string(), json!(3))])));
    }

    #[test]
    fn copies_record_metadata() {
        let sink = Arc::new(MemorySink::new());
        let timestamp = chrono::DateTime::parse_from_rfc3339("2024-05-06T07:08:09Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let record = record().with_timestamp(timestamp);
        let event = adapter(&sink).build_event(&record, &[]);

        assert_eq!(event.message, "disk full");
        assert_eq!(event.logger, "storage");
        assert_eq!(event.timestamp, timestamp);
        assert_eq!(event.level, EventLevel::Error);
    }

    #[test]
    fn non_string_tags_are_stringified() {
        let sink = Arc::new(MemorySink::new());
        let event = adapter(&sink).build_event(
            &record(),
            &[Field::new("#n", 42i64), Field::new("#ok", true)],
        );

        assert_eq!(event.tag("n"), Some("42"));
        assert_eq!(event.tag("ok"), Some("true"));
        assert_eq!(event.extra, None);
    }

    #[test]
    fn extra_keeps_original_types() {
        let sink = Arc::new(MemorySink::new());
        let event = adapter(&sink).build_event(
            &record(),
            &[
                Field::new("ratio", 0.5f64),
                Field::new("nested", json!({"a": [1, 2]})),
                Field::new("name", "x"),
            ],
        );

        assert_eq!(event.extra("ratio"), Some(&json!(0.5)));
        assert_eq!(event.extra("nested"), Some(&json!({"a": [1, 2]})));
        assert_eq!(event.extra("name"), Some(&json!("x")));
        assert_eq!(event.tags, None);
    }

    #[test]
    fn multi_char_prefix_strips_one_character() {
        let sink = Arc::new(MemorySink::new());
        let event = adapter(&sink)
            .with_tag_prefix("%%")
            .build_event(&record(), &[Field::new("%%x", "v"), Field::new("%y", "w")]);

        assert_eq!(event.tag("%x"), Some("v"));
        assert_eq!(event.extra("%y"), Some(&json!("w")));
    }

    #[test]
    fn empty_prefix_falls_back_to_default() {
        let sink = Arc::new(MemorySink::new());
        let event = adapter(&sink)
            .with_tag_prefix("")
            .build_event(&record(), &[Field::new("#env", "prod")]);

        assert_eq!(event.tag("env"), Some("prod"));
    }

    #[test]
    fn no_fields_means_no_maps() {
        let sink = Arc::new(MemorySink::new());
        let event = adapter(&sink).build_event(&record(), &[]);

        assert!(event.tags.is_none());
        assert!(event.extra.is_none());
    }

    #[test]
    fn later_fields_overwrite_earlier_ones() {
        let sink = Arc::new(MemorySink::new());
        let derived = adapter(&sink).derive_with([Field::new("#env", "staging"), Field::new("user", 1i64)]);
        let event = derived.build_event(&record(), &[Field::new("#env", "prod")]);

        assert_eq!(event.tag("env"), Some("prod"));
        assert_eq!(event.extra("user"), Some(&json!(1)));
    }

    #[test]
    fn derive_with_leaves_parent_untouched() {
        let sink = Arc::new(MemorySink::new());
        let base = adapter(&sink).derive_with([Field::new("a", 1i64)]);
        let child = base.derive_with([Field::new("b", 2i64)]);
        let sibling = base.derive_with([Field::new("c", 3i64)]);
        let grandchild = child.derive_with([Field::new("d", 4i64)]);

        let keys = |a: &EventAdapter| a.fields().iter().map(|f| f.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys(&base), vec!["a"]);
        assert_eq!(keys(&child), vec!["a", "b"]);
        assert_eq!(keys(&sibling), vec!["a", "c"]);
        assert_eq!(keys(&grandchild), vec!["a", "b", "d"]);
        assert_eq!(child.tag_prefix(), base.tag_prefix());
    }

    #[test]
    fn initial_fields_come_before_derived_ones() {
        let sink = Arc::new(MemorySink::new());
        let base = EventAdapter::new_with_fields(
            sink,
            Severity::Debug,
            [Field::new("#region", "eu"), Field::new("build", 12i64)],
        );
        let child = base.derive_with([Field::new("#region", "us")]);

        assert_eq!(base.fields().len(), 2);
        let event = child.build_event(&record(), &[]);
        assert_eq!(event.tag("region"), Some("us"));
        assert_eq!(event.extra("build"), Some(&json!(12)));
    }

    #[test]
    fn admits_delegates_to_filter() {
        let sink = Arc::new(MemorySink::new());
        let adapter = EventAdapter::new(sink, Severity::Warn);

        assert!(!adapter.admits(&LogRecord::new(Severity::Info, "x")));
        assert!(adapter.admits(&LogRecord::new(Severity::Warn, "x")));
        assert!(adapter.admits_level(Severity::Fatal));
    }

    #[test]
    fn emit_captures_event() {
        let sink = Arc::new(MemorySink::new());
        adapter(&sink).emit(&record(), &[Field::new("#env", "prod")]).unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag("env"), Some("prod"));
    }

    #[test]
    fn emit_without_id_is_client_unavailable() {
        let sink = Arc::new(MemorySink::new());
        sink.set_unavailable(true);

        assert_eq!(adapter(&sink).emit(&record(), &[]), Err(Error::ClientUnavailable));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn flush_reports_timeout() {
        let sink = Arc::new(MemorySink::new());
        let adapter = adapter(&sink);
        assert_eq!(adapter.flush(), Ok(()));

        sink.set_flush_stalled(true);
        assert_eq!(adapter.flush(), Err(Error::FlushTimeout));
        assert_eq!(sink.last_flush_timeout(), Some(FLUSH_TIMEOUT));
    }
}
