/// Failures surfaced by [`EventAdapter`](crate::adapter::EventAdapter).
///
/// Both are handed back to the caller as-is: the adapter never retries,
/// never logs them and never escalates them.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sink did not hand back an event identifier.
    #[error("event sink client or scope is unavailable")]
    ClientUnavailable,

    /// The sink did not drain within the flush budget.
    #[error("event sink flush timed out")]
    FlushTimeout,
}

/// Error type returned when parsing a [`Severity`](crate::record::Severity).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity: {0:?}")]
pub struct ParseSeverityError(pub String);
