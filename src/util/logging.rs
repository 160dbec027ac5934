//! Structured logging setup
//!
//! Logs always go to stderr so that reports written to stdout stay
//! machine-readable. `RUST_LOG`, when set, takes precedence over the
//! configured level.
//!
//! ```no_run
//! use stackprobe::util::logging;
//!
//! logging::init_from_env();
//! tracing::debug!(root = "/srv/app", "Scanning project");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events
    pub level: Level,

    /// One JSON object per event instead of human-readable lines
    pub use_json: bool,

    pub include_target: bool,

    /// Include source file and line number
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with full metadata, for log collectors
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Derive the configuration from command-line style flags.
    ///
    /// An explicit level wins over `verbose`, which wins over `quiet`;
    /// otherwise `STACKPROBE_LOG_LEVEL` is consulted, defaulting to `warn` so
    /// the CLI stays quiet unless asked.
    pub fn from_flags(level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = if let Some(level) = level {
            parse_level(level)
        } else if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            env::var("STACKPROBE_LOG_LEVEL")
                .map(|v| parse_level(&v))
                .unwrap_or(Level::WARN)
        };

        Self {
            level,
            use_json: json_from_env(),
            ..Default::default()
        }
    }
}

/// Case-insensitive level name; anything unrecognised is `INFO`
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn json_from_env() -> bool {
    env::var("STACKPROBE_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let mut filter = EnvFilter::new(Level::WARN.to_string());
    if let Ok(directive) = format!("stackprobe={}", level).parse() {
        filter = filter.add_directive(directive);
    }
    if let Ok(directive) = "ignore=warn".parse() {
        filter = filter.add_directive(directive);
    }
    filter
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `STACKPROBE_LOG_LEVEL` and `STACKPROBE_LOG_JSON`
pub fn init_from_env() {
    let level = env::var("STACKPROBE_LOG_LEVEL")
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);

    init_logging(LoggingConfig {
        level,
        use_json: json_from_env(),
        ..Default::default()
    });
}
