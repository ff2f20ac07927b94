//! Scripted jobs with call probes, shared by the controller tests.
use std::{cell::RefCell, rc::Rc, time::Duration};

use oev_model::{PreemptReason, Progress, Status};

use crate::{
    clock::{ManualClock, TimeSlice},
    cothread::{Cothread, RunState},
};

/// One scripted `resume` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Work,
    Wait,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Init(&'static str),
    Resume(&'static str, Duration),
    Abort(&'static str),
}

/// Shared call log.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn resumes(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Resume(n, _) if *n == name))
            .count()
    }

    pub fn inits(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Init(n) if *n == name))
            .count()
    }

    pub fn aborts(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Abort(n) if *n == name))
            .count()
    }

    pub fn budgets(&self, name: &str) -> Vec<Duration> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Resume(n, b) if *n == name => Some(*b),
                _ => None,
            })
            .collect()
    }

    fn push(&self, e: Event) {
        self.events.borrow_mut().push(e);
    }
}

/// Job that replays a fixed script, one [`Tick`] per `resume`.
///
/// Script position `i` of `len` reports progress `(i + 1) / len`; `Wait`
/// keeps the previous progress.
pub struct Scripted {
    name: &'static str,
    state: RunState,
    script: Vec<Tick>,
    pos: usize,
    output: Option<i32>,
    finish_with: i32,
    probe: Probe,
    clock: Option<(ManualClock, Duration)>,
}

impl Scripted {
    pub fn new(name: &'static str, script: Vec<Tick>, probe: &Probe) -> Self {
        Self {
            name,
            state: RunState::default(),
            script,
            pos: 0,
            output: None,
            finish_with: 0,
            probe: probe.clone(),
            clock: None,
        }
    }

    /// `steps - 1` work ticks followed by `Done`.
    pub fn working(name: &'static str, steps: usize, probe: &Probe) -> Self {
        let mut script = vec![Tick::Work; steps.saturating_sub(1)];
        script.push(Tick::Done);
        Self::new(name, script, probe)
    }

    pub fn finishing_with(mut self, code: i32) -> Self {
        self.finish_with = code;
        self
    }

    /// Advance `clock` by `cost` on every resume.
    pub fn costing(mut self, clock: &ManualClock, cost: Duration) -> Self {
        self.clock = Some((clock.clone(), cost));
        self
    }

    fn progress_at(&self, pos: usize) -> Progress {
        Progress::from_ratio(pos as u64, self.script.len() as u64)
    }
}

impl Cothread for Scripted {
    type Output = i32;

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        self.pos = 0;
        self.output = None;
        self.state.reset();
        self.probe.push(Event::Init(self.name));
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }
        self.probe.push(Event::Resume(self.name, slice.budget()));
        if let Some((clock, cost)) = &self.clock {
            clock.advance(*cost);
        }

        let tick = self.script.get(self.pos).copied().unwrap_or(Tick::Done);
        self.pos += 1;
        match tick {
            Tick::Done => {
                self.output = Some(self.finish_with);
                self.state.finish()
            }
            Tick::Work => {
                let progress = self.progress_at(self.pos);
                self.state.preempt(PreemptReason::None, progress)
            }
            Tick::Wait => {
                let progress = self.state.status.progress;
                self.state.preempt(PreemptReason::IoWait, progress)
            }
        }
    }

    fn output(&self) -> Option<&i32> {
        self.output.as_ref()
    }

    fn abort(&mut self) {
        self.probe.push(Event::Abort(self.name));
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Job that needs `units` of work, each costing 1ms on `clock`, and does as
/// many as its slice allows per resume.
pub struct Metered {
    state: RunState,
    clock: ManualClock,
    units: u32,
    done: u32,
    resumes: u32,
    finished_on: Option<u32>,
}

impl Metered {
    pub fn new(units: u32, clock: &ManualClock) -> Self {
        Self {
            state: RunState::default(),
            clock: clock.clone(),
            units,
            done: 0,
            resumes: 0,
            finished_on: None,
        }
    }

    /// Work units completed so far.
    pub fn done(&self) -> u32 {
        self.done
    }

    /// Resume count at which the job finished.
    pub fn finished_on(&self) -> Option<u32> {
        self.finished_on
    }
}

impl Cothread for Metered {
    type Output = u32;

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        self.done = 0;
        self.resumes = 0;
        self.finished_on = None;
        self.state.reset();
    }

    fn resume(&mut self, slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }
        self.resumes += 1;
        while self.done < self.units && !slice.expired() {
            self.done += 1;
            self.clock.advance(Duration::from_millis(1));
        }
        if self.done == self.units {
            self.finished_on = Some(self.resumes);
            return self.state.finish();
        }
        let progress = Progress::from_ratio(self.done as u64, self.units as u64);
        self.state.preempt(PreemptReason::None, progress)
    }

    fn output(&self) -> Option<&u32> {
        self.finished_on.as_ref()
    }
}
