//! Cooperative, time-sliced scheduling of resumable tasks.
//!
//! A [`Cothread`] does bounded work per call and reports a [`Status`].
//! [`SequentialController`] and [`ParallelController`] are themselves
//! cothreads, so they nest freely.
mod clock;
pub use clock::{Clock, ManualClock, SystemClock, TimeSlice};

mod cothread;
pub use cothread::{Cothread, RunState};

mod sentinel;
pub use sentinel::{QUIT, Sentinel};

pub mod parallel;
pub use parallel::{IoWaitPolicy, ParallelController};

pub mod sequential;
pub use sequential::{Job, SequentialController};

pub use oev_model::{
    APP_REASON_FLOOR, Completion, MAX_PROGRESS, ModelError, PreemptReason, Progress, Status,
};

#[cfg(test)]
mod testing;
