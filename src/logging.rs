use flexi_logger::{
    detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};

use crate::config::Config;
use crate::error::PrefsError;

const LOG_FILE_SIZE: u64 = 1_000_000;
const LOG_FILES_KEPT: usize = 5;

/// Starts file logging under the configured log directory. Warnings and
/// errors are also echoed to stderr. `RUST_LOG` overrides the configured
/// levels.
pub fn init(config: &Config) -> Result<LoggerHandle, PrefsError> {
    let log_dir = config.log_dir();

    Logger::try_with_env_or_str(config.logging.spec())
        .and_then(|logger| {
            logger
                .log_to_file(FileSpec::default().directory(&log_dir))
                .rotate(
                    Criterion::Size(LOG_FILE_SIZE),
                    Naming::Timestamps,
                    Cleanup::KeepLogFiles(LOG_FILES_KEPT),
                )
                .format_for_files(detailed_format)
                .duplicate_to_stderr(Duplicate::Warn)
                .start()
        })
        .map_err(|e| {
            PrefsError::Error(format!(
                "Failed to start logging in {}: {}",
                log_dir.display(),
                e
            ))
        })
}
