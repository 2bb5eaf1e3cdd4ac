//!
//! This crate defines general utility functions that have no knowledge of
//! automata, such as graph traversal.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

pub mod test_utility;
pub mod traversal;

pub use test_utility::*;
pub use traversal::*;
