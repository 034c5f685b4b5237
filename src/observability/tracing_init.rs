//! Log subscriber setup for the server binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber: an env filter plus one fmt layer in the
/// configured format.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TracingError> {
    let filter = build_env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match (&config.format, config.timestamps) {
        (LogFormat::Pretty, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            )
            .try_init(),
        (LogFormat::Pretty, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_file(config.file_line)
                    .with_line_number(config.file_line)
                    .without_time(),
            )
            .try_init(),
        (LogFormat::Compact, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            )
            .try_init(),
        (LogFormat::Compact, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_file(config.file_line)
                    .with_line_number(config.file_line)
                    .without_time(),
            )
            .try_init(),
        (LogFormat::Json, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_file(config.file_line)
                    .with_line_number(config.file_line),
            )
            .try_init(),
        (LogFormat::Json, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_file(config.file_line)
                    .with_line_number(config.file_line)
                    .without_time(),
            )
            .try_init(),
    };

    result.map_err(|e| TracingError::Init(e.to_string()))
}

/// `RUST_LOG` wins, then the configured filter, then a default that keeps
/// the HTTP stack quiet.
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let base_level = config.level.to_tracing_level().as_str().to_ascii_lowercase();

    if let Ok(directives) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(&base_level));
    }
    match &config.filter {
        Some(filter) => EnvFilter::try_new(format!("{},{}", base_level, filter))
            .unwrap_or_else(|_| EnvFilter::new(&base_level)),
        None => EnvFilter::new(format!(
            "{},hyper=warn,tower=info,tower_http=info",
            base_level
        )),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_rust_log_takes_precedence() {
        let config = LoggingConfig {
            filter: Some("school_portal::gate=trace".into()),
            ..Default::default()
        };
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            assert_eq!(build_env_filter(&config).to_string(), "warn");
        });
    }

    #[test]
    fn test_config_filter_extends_level() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            filter: Some("school_portal::gate=trace".into()),
            ..Default::default()
        };
        temp_env::with_var_unset("RUST_LOG", || {
            let rendered = build_env_filter(&config).to_string();
            assert!(rendered.contains("school_portal::gate=trace"));
            assert!(rendered.contains("debug"));
        });
    }

    #[test]
    fn test_default_filter_quiets_http_stack() {
        temp_env::with_var_unset("RUST_LOG", || {
            let rendered = build_env_filter(&LoggingConfig::default()).to_string();
            assert!(rendered.contains("hyper=warn"));
            assert!(rendered.contains("info"));
        });
    }
}
