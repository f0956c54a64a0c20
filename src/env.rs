//! Environment variable names used by this crate for convenient
//! configuration of the layer from microservices.
//!
//! These are purely helpers; the adapter itself never reads the
//! environment.

/// Prefix marking a field as a tag, e.g. `#`.
pub const EVENT_ADAPTER_TAG_PREFIX_ENV: &str = "EVENT_ADAPTER_TAG_PREFIX";

/// Minimum severity forwarded to the sink, e.g. `warn`.
pub const EVENT_ADAPTER_MIN_LEVEL_ENV: &str = "EVENT_ADAPTER_MIN_LEVEL";

/// Whether to also print events to the console (`true` / `false`).
pub const EVENT_ADAPTER_STDOUT_ENV: &str = "EVENT_ADAPTER_STDOUT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
