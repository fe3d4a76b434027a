//module tree
mod handle;
mod handle_indirection;

//API exports
pub use handle::*;
pub use handle_indirection::*;
