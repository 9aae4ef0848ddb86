//! Logging setup for kubectx-manager.
//!
//! All log lines go to stderr with a level prefix so stdout stays clean for
//! interactive prompts. `--verbose` lowers the filter to DEBUG, `--quiet`
//! raises it to ERROR. The filter comes from the flags alone — never from
//! the environment — so error-level messages cannot be suppressed.

use std::io;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Quiet wins over verbose, matching the CLI contract: `-q` suppresses
/// everything except errors even when `-v` is also given.
pub fn init(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    // try_init so repeated calls (e.g. from tests) are harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
