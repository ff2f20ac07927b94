use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

/// Monotonic elapsed-time source sampled by cothread bodies.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock.
///
/// Clones share the same reading, so a task body can hold a clone and
/// "spend" simulated time while the scheduler samples its own copy.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos
            .fetch_add(by.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.nanos
            .store(at.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Soft deadline handed to [`Cothread::resume`](crate::Cothread::resume).
///
/// Nothing interrupts a body once it runs: the body polls [`TimeSlice::expired`]
/// between units of work and returns on its own. Overrun is therefore bounded
/// only by the body's polling interval. A zero budget never expires.
pub struct TimeSlice<'a> {
    clock: &'a dyn Clock,
    started: Duration,
    budget: Duration,
}

impl<'a> TimeSlice<'a> {
    /// Open a slice starting at the clock's current reading.
    pub fn begin(clock: &'a dyn Clock, budget: Duration) -> Self {
        Self {
            clock,
            started: clock.now(),
            budget,
        }
    }

    /// Clock the slice samples; controllers hand it down to their jobs.
    #[inline]
    pub fn clock(&self) -> &'a dyn Clock {
        self.clock
    }

    #[inline]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.budget.is_zero()
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.started)
    }

    pub fn expired(&self) -> bool {
        !self.is_unbounded() && self.elapsed() >= self.budget
    }

    /// Budget left in this slice, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        if self.is_unbounded() {
            return None;
        }
        Some(self.budget.saturating_sub(self.elapsed()))
    }
}

impl std::fmt::Debug for TimeSlice<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSlice")
            .field("started", &self.started)
            .field("budget", &self.budget)
            .finish()
    }
}
