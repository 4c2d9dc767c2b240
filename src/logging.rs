use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins when set; otherwise this
/// crate logs at `debug` with `verbose` and `warn` without.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    // A second install (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("pr_pulse=debug,warn")
    } else {
        EnvFilter::new("warn")
    }
}
