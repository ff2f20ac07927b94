//! Timer/event driven run loop for any [`Cothread`].
//!
//! The driver owns the "when" of scheduling: it starts a task once, then keeps
//! calling it back according to the status it reports:
//! - `ProcessingData`: yield to the runtime and resume immediately;
//! - `IoWait`: sleep until [`Wake::wake`] is called or the I/O poll interval passes;
//! - anything else: sleep one tick.
mod config;
pub use config::DriverConfig;

use std::sync::Arc;

use oev_core::{Clock, Cothread, PreemptReason, Status, SystemClock};
use oev_observe::log_status;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::{ExecError, ExecResult};

/// Summary of a completed drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Number of `start`/`continue_run`/`loop_run` calls made.
    pub ticks: u64,
    /// Number of runs that reached `Finished`.
    pub cycles: u64,
    /// Last status reported by the task.
    pub status: Status,
}

/// Handle used by I/O completions to wake a driver parked on `IoWait`.
#[derive(Debug, Clone, Default)]
pub struct Wake(Arc<Notify>);

impl Wake {
    pub fn wake(&self) {
        self.0.notify_one();
    }
}

pub struct Driver<K: Clock = SystemClock> {
    cfg: DriverConfig,
    clock: K,
    wake: Wake,
    cancel: CancellationToken,
}

impl Driver<SystemClock> {
    pub fn new(cfg: DriverConfig) -> ExecResult<Self> {
        Self::with_clock(cfg, SystemClock::new())
    }
}

impl<K: Clock> Driver<K> {
    pub fn with_clock(cfg: DriverConfig, clock: K) -> ExecResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            clock,
            wake: Wake::default(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.cfg
    }

    pub fn waker(&self) -> Wake {
        self.wake.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Start `task` and resume it until it finishes.
    #[instrument(level = "debug", skip_all, fields(task = %task.name()))]
    pub async fn run<C>(&self, task: &mut C) -> ExecResult<Report>
    where
        C: Cothread + ?Sized,
    {
        self.apply_budget(task);

        let mut ticks = 1;
        let mut status = task.start(&self.clock);
        log_status(task.name(), ticks, &status);

        while !status.is_finished() {
            self.check_limit(task, ticks)?;
            self.pause_or_abort(task, &status).await?;

            ticks += 1;
            status = task.continue_run(&self.clock);
            log_status(task.name(), ticks, &status);
        }

        debug!(ticks, "task finished");
        Ok(Report {
            ticks,
            cycles: 1,
            status,
        })
    }

    /// Drive `task` through `cycles` complete runs with `loop_run`, pausing one
    /// tick between runs.
    #[instrument(level = "debug", skip_all, fields(task = %task.name(), cycles = cycles))]
    pub async fn run_cycles<C>(&self, task: &mut C, cycles: u64) -> ExecResult<Report>
    where
        C: Cothread + ?Sized,
    {
        if cycles == 0 {
            return Ok(Report {
                ticks: 0,
                cycles: 0,
                status: task.status(),
            });
        }
        self.apply_budget(task);

        let mut ticks = 1;
        let mut done = 0;
        let mut status = task.start(&self.clock);
        loop {
            log_status(task.name(), ticks, &status);
            if status.is_finished() {
                done += 1;
                if done == cycles {
                    return Ok(Report {
                        ticks,
                        cycles: done,
                        status,
                    });
                }
            }

            self.check_limit(task, ticks)?;
            self.pause_or_abort(task, &status).await?;

            ticks += 1;
            status = task.loop_run(&self.clock);
        }
    }

    fn apply_budget<C: Cothread + ?Sized>(&self, task: &mut C) {
        if let Some(budget) = self.cfg.time_budget() {
            task.set_time_budget(budget);
        }
    }

    fn check_limit<C: Cothread + ?Sized>(&self, task: &mut C, ticks: u64) -> ExecResult<()> {
        match self.cfg.max_ticks {
            Some(max) if ticks >= max => {
                warn!(ticks, "tick limit reached before the task finished");
                task.abort();
                Err(ExecError::TickLimit { ticks })
            }
            _ => Ok(()),
        }
    }

    async fn pause_or_abort<C: Cothread + ?Sized>(
        &self,
        task: &mut C,
        status: &Status,
    ) -> ExecResult<()> {
        let res = self.pause(status).await;
        if res.is_err() {
            debug!("driver cancelled; aborting task");
            task.abort();
        }
        res
    }

    async fn pause(&self, status: &Status) -> ExecResult<()> {
        if status.is_preempted() && status.reason == PreemptReason::ProcessingData {
            tokio::task::yield_now().await;
            return if self.cancel.is_cancelled() {
                Err(ExecError::Cancelled)
            } else {
                Ok(())
            };
        }

        let io_wait = status.is_io_wait();
        let delay = if io_wait {
            self.cfg.io_poll()
        } else {
            self.cfg.tick()
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ExecError::Cancelled),
            _ = self.wake.0.notified(), if io_wait => Ok(()),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
