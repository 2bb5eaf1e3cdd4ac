use rand::Rng;

use crate::Automaton;
use crate::StateId;

/// Returns the symbol for the given index, where the symbols are the lower
/// case letters 'a', 'b', ...
pub fn nth_symbol(index: u32) -> char {
    assert!(index < 26, "There are only 26 lower case symbols");
    char::from(b'a' + index as u8)
}

/// Generates a nondeterministic automaton with the desired number of states
/// and symbols, where every state has at most `outdegree` outgoing
/// transitions. The transitions include epsilon transitions, the first state
/// is the start state and the final states are chosen randomly.
pub fn random_automaton<R: Rng>(
    rng: &mut R,
    num_of_states: usize,
    num_of_symbols: u32,
    outdegree: usize,
) -> Automaton<char> {
    let mut automaton = Automaton::new();
    let states: Vec<StateId> = (0..num_of_states).map(|_| automaton.add_state(())).collect();

    for state in &states {
        // Introduce outgoing transitions for this state based on the desired out degree.
        for _ in 0..rng.random_range(0..=outdegree) {
            // Pick a random symbol and state, where zero is the epsilon symbol.
            let symbol = rng.random_range(0..=num_of_symbols);
            let to = states[rng.random_range(0..num_of_states)];

            automaton.add_transition(*state, symbol.checked_sub(1).map(nth_symbol), to, ());
        }

        if rng.random_bool(0.3) {
            automaton.add_final(*state);
        }
    }

    if let Some(first) = states.first() {
        automaton.add_start(*first);
    }

    automaton
}

/// Generates a deterministic automaton with the desired number of states and
/// symbols. Not every state has a transition for every symbol.
pub fn random_deterministic_automaton<R: Rng>(
    rng: &mut R,
    num_of_states: usize,
    num_of_symbols: u32,
) -> Automaton<char> {
    let mut automaton = Automaton::new();
    let states: Vec<StateId> = (0..num_of_states).map(|_| automaton.add_state(())).collect();

    for state in &states {
        for symbol in (0..num_of_symbols).map(nth_symbol) {
            if rng.random_bool(0.8) {
                let to = states[rng.random_range(0..num_of_states)];
                automaton.add_transition(*state, Some(symbol), to, ());
            }
        }

        if rng.random_bool(0.3) {
            automaton.add_final(*state);
        }
    }

    if let Some(first) = states.first() {
        automaton.add_start(*first);
    }

    automaton
}
