mod engine;
mod log_notifier;
mod notify_worker;

pub use engine::*;
pub use log_notifier::*;
pub use notify_worker::*;
