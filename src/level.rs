use crate::event::EventLevel;
use crate::record::Severity;

/// Translate a pipeline severity into the service's severity.
///
/// Panic and fatal records are reported as plain errors: escalating or
/// terminating is left to the logging framework, never to the sink.
pub const fn map_level(level: Severity) -> EventLevel {
    match level {
        Severity::Debug => EventLevel::Debug,
        Severity::Info => EventLevel::Info,
        Severity::Warn => EventLevel::Warning,
        Severity::Error | Severity::DPanic | Severity::Panic | Severity::Fatal => EventLevel::Error,
    }
}

/// Decides whether records at a given severity are processed at all.
pub trait LevelFilter: Send + Sync {
    fn enabled(&self, level: Severity) -> bool;
}

/// A bare severity acts as a minimum threshold.
impl LevelFilter for Severity {
    fn enabled(&self, level: Severity) -> bool {
        level >= *self
    }
}

impl<F> LevelFilter for F
where
    F: Fn(Severity) -> bool + Send + Sync,
{
    fn enabled(&self, level: Severity) -> bool {
        self(level)
    }
}
