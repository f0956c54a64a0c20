use crate::adapter::{EventAdapter, DEFAULT_TAG_PREFIX};
use crate::env::{
    env_or, EVENT_ADAPTER_MIN_LEVEL_ENV, EVENT_ADAPTER_STDOUT_ENV, EVENT_ADAPTER_TAG_PREFIX_ENV,
};
use crate::error::ParseSeverityError;
use crate::layer::EventAdapterLayer;
use crate::record::Severity;
use crate::sink::EventSink;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the adapter layer.
///
/// **Fields**
/// - `tag_prefix`: field-name prefix that turns a field into a tag.
/// - `min_level`: records below this severity never reach the sink.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of [`EventAdapterLayer`] so events are also printed.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub tag_prefix: String,
    pub min_level: Severity,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            min_level: Severity::Error,
            enable_stdout: true,
        }
    }
}

impl LayerConfig {
    /// Build a config from `EVENT_ADAPTER_*` variables, using the
    /// defaults for anything unset.
    ///
    /// **Returns**
    /// - `Err(..)` if `EVENT_ADAPTER_MIN_LEVEL` is not a known severity.
    pub fn from_env() -> Result<Self, ParseSeverityError> {
        let defaults = Self::default();
        let min_level = env_or(EVENT_ADAPTER_MIN_LEVEL_ENV, defaults.min_level.as_str()).parse()?;
        let enable_stdout = !matches!(
            env_or(EVENT_ADAPTER_STDOUT_ENV, "true").trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        );

        Ok(Self {
            tag_prefix: env_or(EVENT_ADAPTER_TAG_PREFIX_ENV, &defaults.tag_prefix),
            min_level,
            enable_stdout,
        })
    }

    /// Adapter described by this config, capturing into `sink`.
    pub fn build_adapter(&self, sink: Arc<dyn EventSink>) -> EventAdapter {
        EventAdapter::new(sink, self.min_level).with_tag_prefix(self.tag_prefix.clone())
    }
}

/// Error returned when the global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] SetGlobalDefaultError),
}

/// Initialize global `tracing` subscriber using the provided sink and
/// [`LayerConfig`].
///
/// **Parameters**
/// - `sink`: implementation of [`EventSink`] that will receive the
///   built events.
/// - `config`: [`LayerConfig`] controlling tag prefix, threshold and
///   console output.
///
/// **Returns**
/// - A clone of the installed [`EventAdapter`]; call
///   [`EventAdapter::flush`] on it before the process exits.
pub fn init_tracing_with_config(
    sink: Arc<dyn EventSink>,
    config: LayerConfig,
) -> Result<EventAdapter, InitError> {
    let adapter = config.build_adapter(sink);
    let layer = EventAdapterLayer::new(adapter.clone());

    // The two subscriber shapes have different types, hence two branches.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    tracing::debug!(
        tag_prefix = %config.tag_prefix,
        min_level = %config.min_level,
        "event adapter installed"
    );
    Ok(adapter)
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::default`].
pub fn init_tracing(sink: Arc<dyn EventSink>) -> Result<EventAdapter, InitError> {
    init_tracing_with_config(sink, LayerConfig::default())
}
