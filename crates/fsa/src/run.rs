use std::hash::Hash;

use crate::epsilon_closure_of;
use crate::Automaton;

/// Returns true iff the automaton accepts the given word. All runs are
/// simulated at once, so the automaton does not have to be deterministic.
pub fn accepts<'a, Symbol, StateData, TransitionData, I>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
    word: I,
) -> bool
where
    Symbol: Clone + Eq + Hash + 'a,
    I: IntoIterator<Item = &'a Symbol>,
{
    let mut current = epsilon_closure_of(automaton, automaton.start_states().iter().copied());

    for symbol in word {
        if current.is_empty() {
            return false;
        }

        let targets = current.iter().flat_map(|state| {
            automaton
                .branch(state, Some(symbol))
                .iter()
                .map(|transition| automaton.get_transition(*transition).to())
        });
        current = epsilon_closure_of(automaton, targets);
    }

    let accepted = current.iter().any(|state| automaton.is_final(state));
    accepted
}
