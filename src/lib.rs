//documentation
#![doc = include_str!("../README.md")]

//module tree
mod blocking_gate;
mod errors;
mod executor;
mod handle;
mod pending_operation;
mod result_callback;
mod signal;
mod suspend_point;
mod timeout;

//API exports
pub use crate::blocking_gate::*;
pub use crate::errors::*;
pub use crate::executor::*;
pub use crate::handle::*;
pub use crate::pending_operation::*;
pub use crate::result_callback::*;
pub use crate::signal::*;
pub use crate::suspend_point::*;
pub use crate::timeout::*;
