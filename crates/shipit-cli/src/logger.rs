//! Logging setup for the shipit CLI.
//!
//! The level is chosen in this order:
//! 1. `--verbose`: debug for shipit crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for shipit crates, warnings for everything else
//!
//! Logs go to stderr so `--json` output on stdout stays parseable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str =
    "warn,shipit_cli=debug,shipit_bundler=debug,shipit_deps=debug,shipit_config=debug";

const DEFAULT_FILTER: &str =
    "warn,shipit_cli=info,shipit_bundler=info,shipit_deps=info,shipit_config=info";

const QUIET_FILTER: &str = "error";

fn filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(fmt_layer)
        .try_init();
}
