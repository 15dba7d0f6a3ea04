//! Tracing subscriber setup
//!
//! The engine itself only emits `tracing` events. Hosts call [`init_logging`]
//! once at startup; later calls are no-ops so tests can call it freely.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{DroverError, DroverResult};

/// Install the global tracing subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `Ok(false)` when a
/// global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> DroverResult<bool> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_ascii_lowercase()))
        .map_err(|e| DroverError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let (writer, ansi) = match (&config.log_to_file, &config.log_file) {
        (true, Some(path)) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DroverError::io_with_path(e.to_string(), path.display().to_string()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| DroverError::io_with_path(e.to_string(), path.display().to_string()))?;
            (BoxMakeWriter::new(Arc::new(file)), false)
        }
        (true, None) => {
            return Err(DroverError::config(
                "logging.log_file is required when logging.log_to_file is set",
            ));
        }
        (false, _) => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_log_to_file_requires_path() {
        let config = LoggingConfig {
            log_to_file: true,
            log_file: None,
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
