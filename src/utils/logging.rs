//! Logging configuration and initialization

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the computed filter
pub const LOG_ENV_VAR: &str = "REPOS_UPDATE_LOG";

/// Maps `-v` occurrences to a filter directive
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing on stderr so logs never mix with the report on stdout
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .try_init();

    debug!("repos-update started with verbosity level: {verbose}");
}
