use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::OffsetTime},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

/// Registry with the level filter applied; every output sits on top of it.
type Filtered = Layered<EnvFilter, Registry>;
type Output = Box<dyn Layer<Filtered> + Send + Sync>;

/// Build the filter and output described by `cfg` and make them the global
/// subscriber. Nothing is installed when either part is invalid.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = filter(&cfg.level)?;
    let output = output(cfg)?;

    if tracing::dispatcher::has_been_set() {
        return Err(LoggerError::AlreadyInitialized);
    }
    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .map_err(|e| LoggerError::InitializationFailed(e.to_string()))
}

fn filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|e| LoggerError::InvalidLogLevel {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

fn output(cfg: &LoggerConfig) -> Result<Output, LoggerError> {
    let layer: Output = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .boxed(),
        // event fields flattened; the current span names the driven task
        LoggerFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .boxed(),
        LoggerFormat::Journald => journald(&cfg.syslog_identifier)?,
    };
    Ok(layer)
}

/// RFC 3339 in the local offset, UTC when the offset cannot be determined
/// (e.g. a multi-threaded process on unix).
fn local_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald(identifier: &str) -> Result<Output, LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::JournaldUnavailable(e.to_string()))?
        .with_syslog_identifier(identifier.to_string());
    Ok(layer.boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald(_identifier: &str) -> Result<Output, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}
