use std::time::Instant;

use tracing::{debug, debug_span};

/// Runs a store call on the UI thread, timing it under `label`.
pub fn run_blocking<F, T>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = debug_span!("blocking", label);
    let _guard = span.enter();
    let started = Instant::now();
    let value = f();
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "finished");
    value
}
