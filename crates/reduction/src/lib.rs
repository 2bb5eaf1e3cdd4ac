//!
//! A crate containing the algorithms that transform automata, namely subset
//! construction and minimization, and the partition refinement they rely on.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod determinization;
mod minimization;
mod refinable_partition;

pub use determinization::*;
pub use minimization::*;
pub use refinable_partition::*;
