//! Subscriber setup for the CLI.
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub json: bool,
    pub no_color: bool,
}

impl LogOptions {
    /// Filter used when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> &'static str {
        if self.verbose {
            "info,pdns_zone_manager=debug"
        } else {
            "info"
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// the run summary.
pub fn init_tracing(opts: LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| opts.default_filter().into());

    if opts.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(!opts.no_color)
            .without_time()
            .init();
    }
}
