/// Installs the global subscriber: `RUST_LOG` filtering (default `info`),
/// uptime timestamps and compact output.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init();
}
