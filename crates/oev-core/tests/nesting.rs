use std::time::Duration;

use oev_core::{
    Cothread, IoWaitPolicy, Job, ManualClock, ParallelController, PreemptReason, Progress, QUIT,
    RunState, SequentialController, Status, TimeSlice,
};

/// Counts down `steps` resumes, optionally blocking on I/O for the first `waits`.
struct Countdown {
    state: RunState,
    steps: u32,
    waits: u32,
    left: u32,
    waited: u32,
    code: i32,
    result: Option<i32>,
}

impl Countdown {
    fn new(steps: u32) -> Self {
        Self {
            state: RunState::default(),
            steps,
            waits: 0,
            left: steps,
            waited: 0,
            code: 0,
            result: None,
        }
    }

    fn waiting(mut self, waits: u32) -> Self {
        self.waits = waits;
        self
    }

    fn code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }
}

impl Cothread for Countdown {
    type Output = i32;

    fn run_state(&self) -> &RunState {
        &self.state
    }

    fn run_state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    fn init(&mut self) {
        self.left = self.steps;
        self.waited = 0;
        self.result = None;
        self.state.reset();
    }

    fn resume(&mut self, _slice: &TimeSlice<'_>) -> Status {
        if self.state.status.is_finished() {
            return self.state.status;
        }
        if self.waited < self.waits {
            self.waited += 1;
            let progress = self.state.status.progress;
            return self.state.preempt(PreemptReason::IoWait, progress);
        }
        self.left = self.left.saturating_sub(1);
        if self.left == 0 {
            self.result = Some(self.code);
            return self.state.finish();
        }
        let done = (self.steps - self.left) as u64;
        self.state
            .preempt(PreemptReason::None, Progress::from_ratio(done, self.steps as u64))
    }

    fn output(&self) -> Option<&i32> {
        self.result.as_ref()
    }
}

fn drive<C: Cothread>(task: &mut C, clock: &ManualClock) -> Vec<Status> {
    let mut seen = vec![task.start(clock)];
    while !seen.last().unwrap().is_finished() {
        assert!(seen.len() < 1000, "task never finished");
        seen.push(task.continue_run(clock));
    }
    seen
}

#[test]
fn parallel_of_sequences_runs_every_chain() {
    let clock = ManualClock::new();
    let chains = vec![
        SequentialController::new(vec![
            Job::task(Countdown::new(2)),
            Job::task(Countdown::new(3).code(11)),
        ]),
        SequentialController::new(vec![
            Job::call(|| 0),
            Job::task(Countdown::new(4).waiting(2).code(22)),
        ]),
    ];
    let mut ctl = ParallelController::new(chains).with_time_budget(Duration::from_millis(20));

    let seen = drive(&mut ctl, &clock);

    for pair in seen.windows(2) {
        assert!(pair[0].progress <= pair[1].progress);
    }
    let results: Vec<Option<i32>> = ctl.jobs().iter().map(|s| s.output().copied()).collect();
    assert_eq!(results, vec![Some(11), Some(22)]);
    assert!(
        ctl.jobs()
            .iter()
            .all(|s| s.time_budget() == Duration::from_millis(10))
    );
}

#[test]
fn sequence_waits_on_nested_parallel_io() {
    let clock = ManualClock::new();
    let inner = ParallelController::new(vec![
        Countdown::new(1).waiting(1),
        Countdown::new(1).waiting(1),
    ])
    .with_policy(IoWaitPolicy::AllWaiting);

    let mut seq = SequentialController::new(vec![Job::task(inner), Job::call(|| ())]);

    let first = seq.start(&clock);
    assert!(first.is_io_wait());

    let seen = drive_from(&mut seq, &clock);
    assert_eq!(*seen.last().unwrap(), Status::finished());
}

fn drive_from<C: Cothread>(task: &mut C, clock: &ManualClock) -> Vec<Status> {
    let mut seen = Vec::new();
    loop {
        let st = task.continue_run(clock);
        seen.push(st);
        if st.is_finished() {
            return seen;
        }
        assert!(seen.len() < 1000, "task never finished");
    }
}

#[test]
fn quit_inside_nested_sequence_only_stops_that_sequence() {
    let clock = ManualClock::new();
    let quitting = SequentialController::new(vec![
        Job::task(Countdown::new(1).code(QUIT)),
        Job::task(Countdown::new(1).code(5)),
    ]);
    let mut outer = SequentialController::new(vec![
        Job::task(quitting),
        Job::task(Countdown::new(1).code(9)),
    ]);

    // The inner sequence finishes with QUIT, which the outer one honours too.
    let st = outer.start(&clock);
    assert!(st.is_finished());
    assert_eq!(outer.output(), Some(&QUIT));
    assert_eq!(outer.current_job(), 0);
}

#[test]
fn boxed_heterogeneous_jobs_share_one_parallel_set() {
    let clock = ManualClock::new();
    let jobs: Vec<Box<dyn Cothread<Output = i32>>> = vec![
        Box::new(Countdown::new(3).code(1)),
        Box::new(SequentialController::new(vec![
            Job::call(|| 0),
            Job::task(Countdown::new(2).code(2)),
        ])),
    ];
    let mut ctl = ParallelController::new(jobs);

    drive(&mut ctl, &clock);
    let codes: Vec<i32> = ctl
        .jobs()
        .iter()
        .filter_map(|j| j.output().copied())
        .collect();
    assert_eq!(codes, vec![1, 2]);
}
