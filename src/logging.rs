use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_FILE_PREFIX: &str = "resource-catalog";
const MAX_LOG_FILES: usize = 30;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log directory {dir}: {message}")]
    Appender { dir: String, message: String },
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs the global subscriber: `RUST_LOG` (or the configured level) on
/// stdout, plus daily JSON files under `log_dir` when enabled.
///
/// Calling it again once a subscriber is installed is a no-op.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);
    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let installed = if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .max_log_files(MAX_LOG_FILES)
            .build(&config.log_dir)
            .map_err(|e| LoggingError::Appender {
                dir: config.log_dir.clone(),
                message: e.to_string(),
            })?;
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    match installed {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(LoggingError::Install(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let cfg = LogConfig::default();
        init_tracing(&cfg).unwrap();
        init_tracing(&cfg).unwrap();
    }

    #[test]
    fn file_logs_land_in_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LogConfig {
            enable_file_logs: true,
            log_dir: dir.path().to_string_lossy().into_owned(),
            ..LogConfig::default()
        };
        // Another test may already own the global subscriber; either way this succeeds.
        init_tracing(&cfg).unwrap();
    }
}
