use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Events go to a daily-rolling file rather than stdout, which belongs to the
/// interactive menu. The returned guard flushes the writer on drop and must be
/// held for the lifetime of the program.
pub fn init_logging(settings: &LoggingSettings) -> Result<WorkerGuard, ConfigError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&settings.file_prefix)
        .build(&settings.directory)
        .map_err(|e| {
            ConfigError::LoggingError(format!(
                "cannot open log directory '{}': {e}",
                settings.directory.display()
            ))
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    tracing::debug!(directory = %settings.directory.display(), "Logging initialised.");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_log_directory_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let settings = LoggingSettings {
            level: "info".to_string(),
            directory: file.path().to_path_buf(),
            file_prefix: "enrollments.log".to_string(),
        };

        let result = init_logging(&settings);

        assert!(matches!(result, Err(ConfigError::LoggingError(_))));
    }
}
