use thiserror::Error;

/// Failures while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}, expected text, json or journald")]
    InvalidFormat(String),
    #[error("journald output needs linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("journald socket unavailable: {0}")]
    JournaldUnavailable(String),
    #[error("a global subscriber is already installed")]
    AlreadyInitialized,
    #[error("subscriber init failed: {0}")]
    InitializationFailed(String),
    #[error("bad filter directive {directive:?}: {reason}")]
    InvalidLogLevel { directive: String, reason: String },
}
