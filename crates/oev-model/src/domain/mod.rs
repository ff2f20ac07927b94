mod completion;
pub use completion::Completion;

mod preempt_reason;
pub use preempt_reason::{APP_REASON_FLOOR, PreemptReason};

mod progress;
pub use progress::{MAX_PROGRESS, Progress};

mod status;
pub use status::Status;
