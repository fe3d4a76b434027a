//module tree
mod cancelable;
mod config;
mod timeout_handle;
mod timeout_scheduler;

//API exports
pub use cancelable::*;
pub use config::*;
pub use timeout_handle::*;
pub use timeout_scheduler::*;
