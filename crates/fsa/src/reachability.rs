use std::hash::Hash;
use std::time::Instant;

use automata_utilities::reachable_vertices;
use log::debug;
use log::trace;
use rustc_hash::FxHashSet;

use crate::Automaton;
use crate::StateId;

/// Returns the states that can be reached from a start state.
pub fn reachable_states<Symbol, StateData, TransitionData>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
) -> FxHashSet<StateId>
where
    Symbol: Clone + Eq + Hash,
{
    reachable_vertices(automaton.start_states().iter().copied(), |state| {
        automaton
            .outgoing(state)
            .iter()
            .map(|transition| automaton.get_transition(*transition).to())
    })
}

/// Returns the states from which a final state can be reached.
pub fn productive_states<Symbol, StateData, TransitionData>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
) -> FxHashSet<StateId>
where
    Symbol: Clone + Eq + Hash,
{
    if automaton.num_of_final_states() == 0 {
        return FxHashSet::default();
    }

    if automaton.num_of_final_states() == automaton.num_of_states() {
        return automaton.iter_states().collect();
    }

    // Search backwards from the final states.
    reachable_vertices(automaton.final_states().iter().copied(), |state| {
        automaton
            .incoming(state)
            .iter()
            .map(|transition| automaton.get_transition(*transition).from())
    })
}

/// Removes all states that can not be reached from a start state, and returns
/// the number of removed states.
pub fn remove_unreachable_states<Symbol, StateData, TransitionData>(
    automaton: &mut Automaton<Symbol, StateData, TransitionData>,
) -> usize
where
    Symbol: Clone + Eq + Hash,
{
    let reachable = reachable_states(automaton);
    remove_states_outside(automaton, |state| reachable.contains(&state))
}

/// Removes all states from which no final state can be reached, and returns
/// the number of removed states.
pub fn remove_unproductive_states<Symbol, StateData, TransitionData>(
    automaton: &mut Automaton<Symbol, StateData, TransitionData>,
) -> usize
where
    Symbol: Clone + Eq + Hash,
{
    let productive = productive_states(automaton);
    remove_states_outside(automaton, |state| productive.contains(&state))
}

/// Removes all states that are unreachable or unproductive, and returns the
/// number of removed states. Both sets are computed on the original automaton.
pub fn trim<Symbol, StateData, TransitionData>(
    automaton: &mut Automaton<Symbol, StateData, TransitionData>,
) -> usize
where
    Symbol: Clone + Eq + Hash,
{
    let start = Instant::now();

    let reachable = reachable_states(automaton);
    let productive = productive_states(automaton);
    let removed = remove_states_outside(automaton, |state| {
        reachable.contains(&state) && productive.contains(&state)
    });

    debug!("Removed {removed} states, {} states remain", automaton.num_of_states());
    debug!("Time trim: {:.3}s", start.elapsed().as_secs_f64());
    removed
}

/// Removes every state for which `keep` does not hold.
fn remove_states_outside<Symbol, StateData, TransitionData>(
    automaton: &mut Automaton<Symbol, StateData, TransitionData>,
    keep: impl Fn(StateId) -> bool,
) -> usize
where
    Symbol: Clone + Eq + Hash,
{
    let removed: Vec<StateId> = automaton.iter_states().filter(|state| !keep(*state)).collect();

    for state in &removed {
        trace!("Removing state {state:?}");
        automaton.remove_state(*state);
    }

    removed.len()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// Returns an automaton s0 -a-> s1 -b-> s2 (final), with a dead end s1 -c-> s3
    /// and a state s4 -a-> s2 that can not be reached.
    fn example() -> (Automaton<char>, Vec<StateId>) {
        let mut automaton = Automaton::new();
        let states: Vec<StateId> = (0..5).map(|_| automaton.add_state(())).collect();

        automaton.add_transition(states[0], Some('a'), states[1], ());
        automaton.add_transition(states[1], Some('b'), states[2], ());
        automaton.add_transition(states[1], Some('c'), states[3], ());
        automaton.add_transition(states[4], Some('a'), states[2], ());
        automaton.add_start(states[0]);
        automaton.add_final(states[2]);

        (automaton, states)
    }

    #[test]
    fn test_reachable_states() {
        let (automaton, states) = example();

        let reachable = reachable_states(&automaton);
        assert_eq!(reachable.len(), 4);
        assert!(!reachable.contains(&states[4]));

        let productive = productive_states(&automaton);
        assert_eq!(productive.len(), 4);
        assert!(!productive.contains(&states[3]));
    }

    #[test]
    fn test_productive_shortcuts() {
        let mut automaton: Automaton<char> = Automaton::new();
        let s0 = automaton.add_state(());
        let s1 = automaton.add_state(());
        automaton.add_transition(s0, Some('a'), s1, ());

        assert!(productive_states(&automaton).is_empty());

        automaton.add_final(s0);
        automaton.add_final(s1);
        assert_eq!(productive_states(&automaton).len(), 2);
    }

    #[test]
    fn test_trim() {
        let (mut automaton, states) = example();

        assert_eq!(trim(&mut automaton), 2);
        assert_eq!(automaton.num_of_states(), 3);
        assert_eq!(automaton.num_of_transitions(), 2);
        assert!(!automaton.contains_state(states[3]));
        assert!(!automaton.contains_state(states[4]));

        // Trimming is idempotent.
        assert_eq!(trim(&mut automaton), 0);
    }

    #[test]
    fn test_remove_separately() {
        let (mut automaton, _) = example();
        assert_eq!(remove_unreachable_states(&mut automaton), 1);
        assert_eq!(remove_unproductive_states(&mut automaton), 1);
        assert_eq!(automaton.num_of_states(), 3);

        // Without start states nothing is reachable.
        automaton.clear_start();
        assert_eq!(remove_unreachable_states(&mut automaton), 3);
        assert_eq!(automaton.num_of_states(), 0);
    }
}
