pub mod record;
pub mod event;
pub mod error;
pub mod level;
pub mod sink;
pub mod adapter;
pub mod layer;

#[cfg(feature = "console")]
pub mod console;

pub mod env;
pub mod init;
pub mod memory;
pub mod noop_sink;

pub use adapter::{EventAdapter, DEFAULT_TAG_PREFIX, FLUSH_TIMEOUT};
pub use error::Error;
pub use event::{EventId, EventLevel, RemoteEvent};
pub use level::{map_level, LevelFilter};
pub use record::{Field, FieldValue, LogRecord, Severity};
pub use sink::EventSink;
