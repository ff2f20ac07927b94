use std::{fmt, time::Duration};

use oev_core::{Cothread, PreemptReason, Progress, RunState, Status, TimeSlice};
use tracing::trace;

/// What one call of a [`FnCothread`] body produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<O> {
    /// Stop for now and report `reason` with `progress`.
    Yield(PreemptReason, Progress),
    /// The work is complete.
    Done(O),
}

impl<O> Step<O> {
    /// Plain budget preemption.
    pub fn more(progress: Progress) -> Self {
        Step::Yield(PreemptReason::None, progress)
    }

    pub fn io_wait(progress: Progress) -> Self {
        Step::Yield(PreemptReason::IoWait, progress)
    }
}

type InitFn<S> = Box<dyn FnMut(&mut S)>;
type BodyFn<S, O> = Box<dyn FnMut(&mut S, &TimeSlice<'_>) -> Step<O>>;

/// Cothread assembled from a context value and two closures.
///
/// `init` resets the context for a new run; `body` does bounded work and
/// reports a [`Step`]. Run bookkeeping (status, caching after completion,
/// output slot) is handled here, so bodies never touch a [`RunState`].
pub struct FnCothread<S, O> {
    name: &'static str,
    ctx: S,
    state: RunState,
    output: Option<O>,
    init: InitFn<S>,
    body: BodyFn<S, O>,
    on_abort: Option<InitFn<S>>,
}

impl<S, O> FnCothread<S, O> {
    pub fn new<I, B>(name: &'static str, ctx: S, init: I, body: B) -> Self
    where
        I: FnMut(&mut S) + 'static,
        B: FnMut(&mut S, &TimeSlice<'_>) -> Step<O> + 'static,
    {
        Self {
            name,
            ctx,
            state: RunState::default(),
            output: None,
            init: Box::new(init),
            body: Box::new(body),
            on_abort: None,
        }
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.state.time_budget = budget;
        self
    }

    /// Hook run by [`Cothread::abort`].
    pub fn with_abort<A>(mut self, on_abort: A) -> Self
    where
        A: FnMut(&mut S) + 'static,
    {
        self.on_abort = Some(Box::new(on_abort));
        self
    }

    pub fn ctx(&self) -> &S {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut S {
        &mut self.ctx
    }

    pub fn into_output(self) -> Option<O> {
        self.output
    }
}

impl<S, O> Cothread for FnCothread<S, O> {
    type Output = O;

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        self.output = None;
        (self.init)(&mut self.ctx);
        self.state.reset();
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }
        match (self.body)(&mut self.ctx, slice) {
            Step::Done(out) => {
                trace!(task = self.name, elapsed_us = slice.elapsed().as_micros() as u64, "body finished");
                self.output = Some(out);
                self.state.finish()
            }
            Step::Yield(reason, progress) => self.state.preempt(reason, progress),
        }
    }

    fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    fn abort(&mut self) {
        if let Some(hook) = self.on_abort.as_mut() {
            hook(&mut self.ctx);
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl<S: fmt::Debug, O: fmt::Debug> fmt::Debug for FnCothread<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCothread")
            .field("name", &self.name)
            .field("ctx", &self.ctx)
            .field("state", &self.state)
            .field("output", &self.output)
            .finish()
    }
}
