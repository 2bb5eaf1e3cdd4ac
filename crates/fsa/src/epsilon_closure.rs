use std::hash::Hash;

use automata_utilities::reachable_vertices;
use rustc_hash::FxHashMap;

use crate::Automaton;
use crate::StateId;
use crate::StateSet;

/// Returns the given state together with all states that can be reached from
/// it by epsilon transitions only.
pub fn epsilon_closure<Symbol, StateData, TransitionData>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
    state: StateId,
) -> StateSet
where
    Symbol: Clone + Eq + Hash,
{
    epsilon_closure_of(automaton, [state])
}

/// Returns the union of the epsilon closures of the given states.
pub fn epsilon_closure_of<Symbol, StateData, TransitionData, I>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
    states: I,
) -> StateSet
where
    Symbol: Clone + Eq + Hash,
    I: IntoIterator<Item = StateId>,
{
    if automaton.num_of_epsilon_transitions() == 0 {
        return states.into_iter().collect();
    }

    reachable_vertices(states, |state| {
        automaton
            .branch(state, None)
            .iter()
            .map(|transition| automaton.get_transition(*transition).to())
    })
    .into_iter()
    .collect()
}

/// Computes the epsilon closure of every state.
pub fn epsilon_closures<Symbol, StateData, TransitionData>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
) -> FxHashMap<StateId, StateSet>
where
    Symbol: Clone + Eq + Hash,
{
    automaton
        .iter_states()
        .map(|state| (state, epsilon_closure(automaton, state)))
        .collect()
}

#[cfg(test)]
mod tests {
    use automata_utilities::random_test;
    use test_log::test;

    use crate::random_automaton;

    use super::*;

    #[test]
    fn test_epsilon_closure() {
        let mut automaton: Automaton<char> = Automaton::new();
        let states: Vec<StateId> = (0..4).map(|_| automaton.add_state(())).collect();

        // An epsilon cycle s0 -> s1 -> s0, with s1 -> s2 and a symbol to s3.
        automaton.add_transition(states[0], None, states[1], ());
        automaton.add_transition(states[1], None, states[0], ());
        automaton.add_transition(states[1], None, states[2], ());
        automaton.add_transition(states[2], Some('a'), states[3], ());

        let closure = epsilon_closure(&automaton, states[0]);
        assert_eq!(closure, [states[0], states[1], states[2]].into_iter().collect::<StateSet>());
        assert_eq!(epsilon_closure(&automaton, states[3]), StateSet::singleton(states[3]));
        assert_eq!(
            epsilon_closure_of(&automaton, [states[2], states[3]]),
            [states[2], states[3]].into_iter().collect::<StateSet>()
        );
    }

    #[test]
    fn test_random_epsilon_closure_idempotent() {
        random_test(100, |rng| {
            let automaton = random_automaton(rng, 10, 2, 3);
            let closures = epsilon_closures(&automaton);

            for (state, closure) in &closures {
                assert!(closure.contains(*state));

                for member in closure {
                    assert!(
                        closures[&member].is_subset(closure),
                        "The closure of {member:?} should be contained in the closure of {state:?}"
                    );
                }
            }
        });
    }
}
