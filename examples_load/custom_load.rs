use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use tracing_event_adapter::init::{init_tracing_with_config, LayerConfig};
use tracing_event_adapter::memory::MemorySink;
use tracing_event_adapter::Severity;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(MemorySink::new());

    let layer_config = LayerConfig {
        tag_prefix: "@".to_string(),
        min_level: Severity::Warn,
        enable_stdout: false,
    };

    let adapter = init_tracing_with_config(sink.clone(), layer_config)?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        // Filtered out by the adapter before any event is built.
        info!(iteration = i, "custom load test info");
        error!(iteration = i, "@load" = "custom", "custom load test error");
    }

    let elapsed = start.elapsed();
    println!("custom config: captured {} of {} events in {:?} (~{:.0} ev/s)",
        sink.events().len(),
        2 * n,
        elapsed,
        (2 * n) as f64 / elapsed.as_secs_f64()
    );

    adapter.flush()?;
    Ok(())
}
