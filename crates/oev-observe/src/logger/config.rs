use std::io::IsTerminal;

use serde::Deserialize;

use crate::logger::format::LoggerFormat;

/// Logger settings; every field may be omitted in a config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `oev_core=trace,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
    /// `SYSLOG_IDENTIFIER` of journald entries.
    pub syslog_identifier: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::default(),
            level: "info".to_string(),
            with_targets: true,
            use_color,
            syslog_identifier: "oev".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{"level":"debug"}"#).unwrap();
        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert!(cfg.with_targets);
    }

    #[test]
    fn format_is_parsed_from_config() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format":"json","withTargets":false}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert!(!cfg.with_targets);
    }

    #[test]
    fn syslog_identifier_defaults_and_overrides() {
        assert_eq!(LoggerConfig::default().syslog_identifier, "oev");
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"syslogIdentifier":"sumsq"}"#).unwrap();
        assert_eq!(cfg.syslog_identifier, "sumsq");
    }
}
