use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("invalid driver config: {0}")]
    InvalidConfig(String),
    #[error("task did not finish within {ticks} ticks")]
    TickLimit { ticks: u64 },
    #[error("cancelled")]
    Cancelled,
}

pub type ExecResult<T> = Result<T, ExecError>;
