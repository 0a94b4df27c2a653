//! Logging setup.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Map a `LOG_LEVEL` value to a filter; unknown values fall back to info.
fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// `RUST_LOG` directives win when present and valid; otherwise the
/// configured level applies to everything.
fn build_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    let directives = rust_log.map(str::trim).filter(|d| !d.is_empty());

    if let Some(directives) = directives {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("Ignoring invalid RUST_LOG `{}`: {}", directives, e),
        }
    }

    EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .parse_lossy("")
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
pub fn init(level: &str) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(build_filter(level, rust_log.as_deref()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_names() {
        assert_eq!(level_filter("trace"), LevelFilter::TRACE);
        assert_eq!(level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(level_filter(" Info "), LevelFilter::INFO);
        assert_eq!(level_filter("warning"), LevelFilter::WARN);
        assert_eq!(level_filter("error"), LevelFilter::ERROR);
        assert_eq!(level_filter("off"), LevelFilter::OFF);
        assert_eq!(level_filter("verbose"), LevelFilter::INFO);
    }

    #[test]
    fn test_configured_level_without_rust_log() {
        let filter = build_filter("warn", None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = build_filter("warn", Some("  "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_bare_rust_log_level_overrides_configured_level() {
        let filter = build_filter("info", Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = build_filter("debug", Some("error"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_rust_log_target_directives() {
        let filter = build_filter("error", Some("feedbot=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_invalid_rust_log_falls_back() {
        let filter = build_filter("warn", Some("feedbot=loud"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
