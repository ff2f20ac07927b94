mod config;
mod error;
mod format;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

use tracing::debug;

/// Install the process-wide subscriber described by `cfg`.
///
/// Can succeed once per process; later calls return
/// [`LoggerError::AlreadyInitialized`].
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    log::install(cfg)?;
    debug!(format = ?cfg.format, level = %cfg.level, "logger initialised");
    Ok(())
}
