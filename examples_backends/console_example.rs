use std::sync::Arc;

use tracing::{error, warn};
use tracing_event_adapter::console::ConsoleSink;
use tracing_event_adapter::init::{init_tracing_with_config, LayerConfig};

/// Prints every captured event as a JSON line on stdout.
///
/// Try `EVENT_ADAPTER_MIN_LEVEL=warn EVENT_ADAPTER_STDOUT=false`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LayerConfig::from_env()?;
    let adapter = init_tracing_with_config(Arc::new(ConsoleSink::stdout()), config)?;

    warn!("#component" = "cache", hit_ratio = 0.42, "cache hit ratio low");
    error!("#component" = "db", "#shard" = 7u64, retries = 2u64, "query failed");

    adapter.flush()?;
    Ok(())
}
