use std::{ops::ControlFlow, time::Duration};

use oev_core::{Cothread, MAX_PROGRESS, PreemptReason, Progress, RunState, Status, TimeSlice};

/// Result of a run: the sum, carried as `Continue` so a sequence never
/// mistakes a sum for its quit value.
pub type Sum = ControlFlow<(), u64>;

/// Sums `i * i` for `i in 1..=n`, a slice at a time.
#[derive(Debug)]
pub struct SumOfSquares {
    state: RunState,
    n: u64,
    /// Squares added so far; the next term is `i + 1`.
    i: u64,
    sum: u64,
    result: Option<Sum>,
}

impl SumOfSquares {
    pub fn new(n: u64, budget: Duration) -> Self {
        Self {
            state: RunState::with_budget(budget),
            n,
            i: 0,
            sum: 0,
            result: None,
        }
    }

    pub fn sum(&self) -> Option<u64> {
        self.result.and_then(ControlFlow::continue_value)
    }

    /// Next term scaled to progress units over `n + 1` steps.
    fn progress(&self) -> Progress {
        let scaled = (self.i as u128 + 1) * MAX_PROGRESS as u128 / (self.n as u128 + 1);
        Progress::saturating(scaled.min(u64::MAX as u128) as u64)
    }
}

impl Cothread for SumOfSquares {
    type Output = Sum;

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        self.i = 0;
        self.sum = 0;
        self.result = None;
        self.state.reset();
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }

        while self.i < self.n && !slice.expired() {
            self.i += 1;
            self.sum = self.sum.wrapping_add(self.i.wrapping_mul(self.i));
        }

        if self.i == self.n {
            self.result = Some(ControlFlow::Continue(self.sum));
            return self.state.finish();
        }
        let progress = self.progress();
        self.state.preempt(PreemptReason::None, progress)
    }

    fn output(&self) -> Option<&Sum> {
        self.result.as_ref()
    }

    fn name(&self) -> &str {
        "sum-of-squares"
    }
}
