use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the default level.
/// Output goes to stderr so stdout stays free for the JSON result.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
