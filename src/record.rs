use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseSeverityError;

/// Severity of a log record as seen by the logging pipeline.
///
/// Variants are ordered from least to most severe so a threshold can be
/// expressed as `level >= min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    DPanic,
    Panic,
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::DPanic,
        Severity::Panic,
        Severity::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::DPanic => "dpanic",
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "dpanic" => Ok(Severity::DPanic),
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// `tracing` has no panic/fatal levels; `TRACE` folds into `Debug`.
impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// One finalized log call: what happened, when, how bad, and who said it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub logger_name: String,
}

impl LogRecord {
    /// Build a record stamped with the current time and no logger name.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            logger_name: String::new(),
        }
    }

    pub fn with_logger(mut self, logger_name: impl Into<String>) -> Self {
        self.logger_name = logger_name.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Value carried by a [`Field`].
///
/// Only the string/non-string distinction matters for classification:
/// strings become tags as-is, everything else is rendered through
/// [`fmt::Display`] when it lands in the tag map and kept as structured
/// JSON when it lands in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Other(serde_json::Value),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            FieldValue::Other(_) => None,
        }
    }

    /// Text form used for tag values.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Structured form used for `extra`, original type preserved.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Other(v) => v.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Other(serde_json::Value::String(s)) => f.write_str(s),
            FieldValue::Other(serde_json::Value::Number(n)) => write!(f, "{}", n),
            FieldValue::Other(serde_json::Value::Bool(b)) => write!(f, "{}", b),
            FieldValue::Other(serde_json::Value::Null) => f.write_str("null"),
            // Arrays and objects: compact JSON.
            FieldValue::Other(other) => write!(f, "{}", other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Other(serde_json::Value::Bool(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Other(serde_json::Value::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Other(serde_json::Value::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Other(serde_json::Value::from(value))
    }
}

impl From<f64> for FieldValue {
    /// Non-finite floats have no JSON number form and fall back to text.
    fn from(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(n) => FieldValue::Other(serde_json::Value::Number(n)),
            None => FieldValue::String(value.to_string()),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => FieldValue::String(s),
            other => FieldValue::Other(other),
        }
    }
}

/// A key/value pair of structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
