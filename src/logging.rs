//! Logger setup for the viewer and for tests
//!
//! The library only emits through the `log` facade; binaries pick the
//! backend. This installs `env_logger`.

use std::sync::Once;

/// `env_filter` uses the `env_logger` filter syntax (e.g. "debug",
/// "softraster=trace"). When unset, `RUST_LOG` is consulted, then
/// `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Per-frame pipeline statistics included
    pub fn verbose() -> Self {
        Self {
            default_level: log::LevelFilter::Debug,
            ..Default::default()
        }
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Later calls are ignored, and so is an
/// already-installed logger from elsewhere.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging(LoggingConfig {
            env_filter: Some("warn".to_string()),
            ..Default::default()
        });
        init_logging(LoggingConfig::verbose());
        log::warn!("still alive");
    }

    #[test]
    fn test_verbose_lowers_level() {
        assert_eq!(LoggingConfig::verbose().default_level, log::LevelFilter::Debug);
        assert_eq!(LoggingConfig::default().default_level, log::LevelFilter::Info);
    }
}
