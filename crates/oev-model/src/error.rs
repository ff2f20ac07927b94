use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("progress {0} exceeds maximum {max}", max = crate::MAX_PROGRESS)]
    ProgressOutOfRange(u32),
    #[error("preempt reason code {0} is reserved by the framework")]
    ReservedReason(u16),
    #[error("application preempt reason {0} is below the reserved floor {floor}", floor = crate::APP_REASON_FLOOR)]
    AppReasonBelowFloor(u16),
}
