//! tracing-subscriber setup

use crate::config::CliConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` wins over the verbosity default.
/// Logs go to stderr so stdout stays the report.
pub fn init_logging(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // a second init (tests) is not an error worth reporting
    if config.log_json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.with_ansi(config.color.should_color()).compact().try_init();
    }
}
