//! Logging configuration for Wordleish.
//!
//! Logs go to stderr so they never interleave with game output on stdout.

use tracing_subscriber::EnvFilter;

/// Returns the filter directive for the given verbosity.
///
/// `RUST_LOG` always wins when set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "wordleish=debug,info"
    } else {
        "info"
    }
}

/// Initializes logging to stderr.
pub fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
