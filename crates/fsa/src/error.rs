use thiserror::Error;

/// The errors that can be reported by operations on automata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("The automaton has {0} start states, but a deterministic automaton has at most one")]
    MultipleStartStates(usize),

    #[error("The automaton has {0} epsilon transitions, but a deterministic automaton has none")]
    EpsilonTransitions(usize),

    #[error(
        "The automaton has {0} ambiguous transitions, but a deterministic automaton has at most \
         one transition per state and symbol"
    )]
    AmbiguousTransitions(usize),
}
