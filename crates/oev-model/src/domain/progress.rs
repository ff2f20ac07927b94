use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Fixed-point value representing 100% progress.
pub const MAX_PROGRESS: u16 = 32767;

/// Fixed-point fraction of work completed, out of [`MAX_PROGRESS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Progress(u16);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const FULL: Progress = Progress(MAX_PROGRESS);

    /// Validate a raw fixed-point value.
    pub fn new(raw: u32) -> Result<Self, ModelError> {
        if raw > MAX_PROGRESS as u32 {
            return Err(ModelError::ProgressOutOfRange(raw));
        }
        Ok(Progress(raw as u16))
    }

    /// Build from a raw value, saturating at [`MAX_PROGRESS`].
    #[inline]
    pub fn saturating(raw: u64) -> Self {
        Progress(raw.min(MAX_PROGRESS as u64) as u16)
    }

    /// `done / total` scaled to the fixed-point range; `total == 0` counts as complete.
    pub fn from_ratio(done: u64, total: u64) -> Self {
        if total == 0 {
            return Progress::FULL;
        }
        let scaled = (done as u128 * MAX_PROGRESS as u128) / total as u128;
        Progress::saturating(scaled.min(u64::MAX as u128) as u64)
    }

    #[inline]
    pub fn raw(&self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.0 == MAX_PROGRESS
    }

    /// Progress as a percentage in `0.0..=100.0`.
    pub fn percent(&self) -> f64 {
        self.0 as f64 * 100.0 / MAX_PROGRESS as f64
    }
}

impl TryFrom<u16> for Progress {
    type Error = ModelError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Progress::new(raw as u32)
    }
}

impl From<Progress> for u16 {
    fn from(p: Progress) -> Self {
        p.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.percent())
    }
}
