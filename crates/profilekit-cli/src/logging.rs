//! Log output of the command-line front end

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "PROFILEKIT_LOG";

/// Install the global subscriber writing to stderr
///
/// Directives from [`LOG_ENV`] win over the verbosity flag.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber installed earlier keeps receiving events.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
