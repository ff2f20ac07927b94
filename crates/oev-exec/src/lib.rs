mod error;
pub use error::{ExecError, ExecResult};

pub mod r#fn;
pub use r#fn::{FnCothread, Step};

pub mod driver;
pub use driver::{Driver, DriverConfig, Report, Wake};

pub mod prelude {
    pub use crate::error::{ExecError, ExecResult};
    pub use crate::{Driver, DriverConfig, FnCothread, Step};
    pub use oev_core::{Cothread, Job, ParallelController, SequentialController};
}
