//! Request handlers for transform operations.

mod transform;

pub use transform::*;
