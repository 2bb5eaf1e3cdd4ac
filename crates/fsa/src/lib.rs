//!
//! A crate containing finite state automata, and the traversals over them
//! that are shared by the reduction algorithms.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod arena;
mod automaton;
mod epsilon_closure;
mod error;
mod random_automaton;
mod reachability;
mod run;
mod state_set;

pub use automaton::*;
pub use epsilon_closure::*;
pub use error::*;
pub use random_automaton::*;
pub use reachability::*;
pub use run::*;
pub use state_set::*;
