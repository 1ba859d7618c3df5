//! Logging setup for applications embedding the core.

use tracing_subscriber::EnvFilter;

/// Installs a compact `tracing` subscriber writing to stdout.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once (or after another subscriber was installed) does nothing.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .compact()
        .try_init();
}
