use std::time::Duration;

use serde::Deserialize;

use crate::error::ExecError;

/// Timing knobs of a [`Driver`](crate::Driver).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverConfig {
    /// Pause between ticks after a plain budget preemption.
    pub tick_ms: u64,
    /// Overrides the task's own per-resume budget when set. `0` = run to completion.
    pub time_budget_ms: Option<u64>,
    /// Fallback poll interval while the task waits on I/O and nobody wakes the driver.
    pub io_poll_ms: u64,
    /// Give up after this many resumes.
    pub max_ticks: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            time_budget_ms: None,
            io_poll_ms: 250,
            max_ticks: None,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.tick_ms == 0 {
            return Err(ExecError::InvalidConfig("tickMs must be > 0".into()));
        }
        if self.io_poll_ms == 0 {
            return Err(ExecError::InvalidConfig("ioPollMs must be > 0".into()));
        }
        if self.max_ticks == Some(0) {
            return Err(ExecError::InvalidConfig("maxTicks must be > 0".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    #[inline]
    pub fn io_poll(&self) -> Duration {
        Duration::from_millis(self.io_poll_ms)
    }

    #[inline]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}
