use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Logs go to stderr so JSON on stdout (and the MCP stdio transport) stays
/// clean. `RUST_LOG` takes precedence over the verbosity flag.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "rootplan=debug" } else { "rootplan=info" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
