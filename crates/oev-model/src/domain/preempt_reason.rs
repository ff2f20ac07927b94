use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Lowest code available to application-defined preempt reasons.
///
/// Codes between [`PreemptReason::ProcessingData`] and this floor are kept free
/// for future framework-level reasons.
pub const APP_REASON_FLOOR: u16 = 16;

/// Why a cothread returned while still [`Preempted`](crate::Completion::Preempted).
///
/// Serialized as its numeric code:
/// - `0` not applicable (also the value carried by finished statuses)
/// - `1` waiting on an external event
/// - `2` data is ready; poll again immediately
/// - `>= APP_REASON_FLOOR` application specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum PreemptReason {
    /// Not applicable: plain time-budget preemption, or a finished status.
    #[default]
    None,
    /// Further progress depends on an external event, not on more CPU time.
    IoWait,
    /// Work is ready to process; the driver should poll again without waiting.
    ProcessingData,
    /// Application-defined reason, always `>= APP_REASON_FLOOR`.
    App(u16),
}

impl PreemptReason {
    /// Build an application-defined reason, rejecting codes in the framework range.
    pub fn app(code: u16) -> Result<Self, ModelError> {
        if code < APP_REASON_FLOOR {
            return Err(ModelError::AppReasonBelowFloor(code));
        }
        Ok(PreemptReason::App(code))
    }

    /// Decode a raw wire code.
    pub fn from_code(code: u16) -> Result<Self, ModelError> {
        match code {
            0 => Ok(PreemptReason::None),
            1 => Ok(PreemptReason::IoWait),
            2 => Ok(PreemptReason::ProcessingData),
            c if c >= APP_REASON_FLOOR => Ok(PreemptReason::App(c)),
            c => Err(ModelError::ReservedReason(c)),
        }
    }

    /// Raw wire code.
    #[inline]
    pub fn code(&self) -> u16 {
        match self {
            PreemptReason::None => 0,
            PreemptReason::IoWait => 1,
            PreemptReason::ProcessingData => 2,
            PreemptReason::App(c) => *c,
        }
    }

    /// Short symbolic name, intended for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreemptReason::None => "none",
            PreemptReason::IoWait => "io-wait",
            PreemptReason::ProcessingData => "processing-data",
            PreemptReason::App(_) => "app",
        }
    }
}

impl TryFrom<u16> for PreemptReason {
    type Error = ModelError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        PreemptReason::from_code(code)
    }
}

impl From<PreemptReason> for u16 {
    fn from(reason: PreemptReason) -> Self {
        reason.code()
    }
}

impl fmt::Display for PreemptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreemptReason::App(c) => write!(f, "app({c})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framework_codes_are_stable() {
        assert_eq!(PreemptReason::None.code(), 0);
        assert_eq!(PreemptReason::IoWait.code(), 1);
        assert_eq!(PreemptReason::ProcessingData.code(), 2);
    }

    #[test]
    fn reserved_codes_are_rejected() {
        assert_eq!(
            PreemptReason::from_code(3),
            Err(ModelError::ReservedReason(3))
        );
        assert_eq!(
            PreemptReason::from_code(APP_REASON_FLOOR - 1),
            Err(ModelError::ReservedReason(APP_REASON_FLOOR - 1))
        );
    }

    #[test]
    fn app_codes_start_at_floor() {
        assert!(PreemptReason::app(APP_REASON_FLOOR).is_ok());
        assert_eq!(
            PreemptReason::app(2),
            Err(ModelError::AppReasonBelowFloor(2))
        );
        assert_eq!(
            PreemptReason::from_code(40),
            Ok(PreemptReason::App(40))
        );
    }

    #[test]
    fn serde_encodes_numeric_code() {
        let json = serde_json::to_string(&PreemptReason::IoWait).unwrap();
        assert_eq!(json, "1");

        let back: PreemptReason = serde_json::from_str("17").unwrap();
        assert_eq!(back, PreemptReason::App(17));

        assert!(serde_json::from_str::<PreemptReason>("5").is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(PreemptReason::IoWait.to_string(), "io-wait");
        assert_eq!(PreemptReason::App(20).to_string(), "app(20)");
    }
}
