//! stderr logging via `tracing-subscriber`.
//!
//! stdout carries exactly one JSON document, so every diagnostic goes to
//! stderr. Verbosity: none = warn, `-v` = info, `-vv` = debug, `-vvv` = trace.
//! `BCHART_LOG` (an `EnvFilter` directive string) overrides the flag.
//! Engine crates log through the `log` facade; the subscriber bridges those
//! records into the same output.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BCHART_LOG";

pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn filter_for(verbosity: u8) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

/// Install the global subscriber. A second call keeps the first one.
pub fn init(verbosity: u8) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity))
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::WARN);
        assert_eq!(level_for(2), LevelFilter::DEBUG);
        assert_eq!(level_for(9), LevelFilter::TRACE);
    }

    #[test]
    fn default_directive_follows_verbosity() {
        std::env::remove_var(LOG_ENV);
        assert_eq!(filter_for(1).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(filter_for(3).max_level_hint(), Some(LevelFilter::TRACE));
    }
}
