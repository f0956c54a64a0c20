use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use tracing_event_adapter::init::init_tracing;
use tracing_event_adapter::memory::MemorySink;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(MemorySink::new());
    let adapter = init_tracing(sink.clone())?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "#load" = "default", "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: captured {} events in {:?} (~{:.0} ev/s)",
        sink.events().len(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    adapter.flush()?;
    Ok(())
}
