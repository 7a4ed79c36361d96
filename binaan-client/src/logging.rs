//! Subscriber setup for the `binaan` binary

use tracing_subscriber::{EnvFilter, fmt};

/// Level used when neither `RUST_LOG` nor `-v` says otherwise
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Directive for a `-v` count: none keeps the default, `-v` is debug for
/// this crate, `-vv` and more is trace everywhere
pub fn directive(verbose: u8) -> &'static str {
    match verbose {
        0 => DEFAULT_DIRECTIVE,
        1 => "warn,binaan_client=debug,binaan_dispatch_core=debug",
        _ => "trace",
    }
}

/// Install the global subscriber; `-v` wins over `RUST_LOG`
pub fn init(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new(directive(verbose))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    };

    // A second init (tests, embedding) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
