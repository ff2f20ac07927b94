mod logger;
pub use logger::*;

mod view;
pub use view::{log_status, message_for};
