use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber (stderr, human-readable).
///
/// `RUST_LOG` takes precedence; otherwise `-v` flags raise the crate's level.
pub fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "wage_cpi=info",
        1 => "wage_cpi=debug",
        _ => "wage_cpi=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
