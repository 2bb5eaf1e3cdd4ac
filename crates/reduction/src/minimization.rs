use std::hash::Hash;
use std::time::Instant;

use automata_fsa::trim;
use automata_fsa::Automaton;
use automata_fsa::AutomatonError;
use automata_fsa::StateId;
use automata_fsa::TransitionId;
use log::debug;
use log::trace;
use rustc_hash::FxHashMap;

use crate::BlockIndex;
use crate::ElementIndex;
use crate::RefinablePartition;

/// Computes the minimal deterministic automaton that accepts the same
/// language as the given deterministic automaton, using the partition
/// refinement algorithm of Valmari.
///
/// The automaton is trimmed first, so the result has no unreachable or
/// unproductive states. The data of every resulting state and transition is
/// taken from one of the states and transitions that it represents.
pub fn minimize<Symbol, StateData, TransitionData>(
    mut automaton: Automaton<Symbol, StateData, TransitionData>,
) -> Result<Automaton<Symbol, StateData, TransitionData>, AutomatonError>
where
    Symbol: Clone + Eq + Hash,
    StateData: Clone,
    TransitionData: Clone,
{
    automaton.ensure_deterministic()?;

    let start = Instant::now();
    trim(&mut automaton);

    let mut result = Automaton::new();
    if automaton.num_of_states() == 0 {
        debug!("The trimmed automaton is empty");
        return Ok(result);
    }

    // Initially the states are partitioned into final and non-final states.
    let mut blocks: RefinablePartition<StateId> = RefinablePartition::new();
    let initial_block = blocks.add_set();

    let mut state_element: FxHashMap<StateId, ElementIndex> = FxHashMap::default();
    for state in automaton.iter_states() {
        state_element.insert(state, blocks.insert_one(initial_block, state));
    }

    for state in automaton.final_states() {
        blocks.mark(state_element[state]);
    }
    blocks.split();

    // The transitions are partitioned into cords, initially one per symbol.
    let mut cords: RefinablePartition<TransitionId> = RefinablePartition::new();

    let mut symbol_cord: FxHashMap<Symbol, BlockIndex> = FxHashMap::default();
    let mut transition_element: FxHashMap<TransitionId, ElementIndex> = FxHashMap::default();
    for transition in automaton.iter_transitions() {
        let Some(symbol) = automaton.get_transition(transition).symbol() else {
            unreachable!("A deterministic automaton has no epsilon transitions");
        };

        let cord = *symbol_cord
            .entry(symbol.clone())
            .or_insert_with(|| cords.add_set());
        transition_element.insert(transition, cords.insert_one(cord, transition));
    }

    // Split the blocks by the sources of every cord, and the cords by the
    // targets in every block but the first one.
    let mut block = 1;
    let mut cord = 0;
    while cord < cords.num_of_blocks() {
        for element in cords.iter_block(cord) {
            let transition = automaton.get_transition(*cords.element(element));
            blocks.mark(state_element[&transition.from()]);
        }
        blocks.split();
        cord += 1;

        while block < blocks.num_of_blocks() {
            for element in blocks.iter_block(block) {
                for transition in automaton.incoming(*blocks.element(element)) {
                    cords.mark(transition_element[transition]);
                }
            }
            cords.split();
            block += 1;
        }
    }

    trace!("Final partition {blocks:?}");

    // Every block becomes a state, with the outgoing transitions of one of its members.
    let mut representatives: Vec<StateId> = Vec::with_capacity(blocks.num_of_blocks());
    let mut block_state: Vec<StateId> = Vec::with_capacity(blocks.num_of_blocks());
    for block in blocks.blocks() {
        let Some(element) = blocks.iter_block(block).next() else {
            unreachable!("Block {block} is empty");
        };

        let representative = *blocks.element(element);
        let state = result.add_state(automaton.state_data(representative).clone());
        if automaton.is_final(representative) {
            result.add_final(state);
        }

        representatives.push(representative);
        block_state.push(state);
    }

    let state_of = |state: StateId| block_state[blocks.block_of(state_element[&state])];
    for (block, representative) in representatives.iter().enumerate() {
        for transition in automaton.outgoing(*representative) {
            let transition = automaton.get_transition(*transition);

            result.add_transition(
                block_state[block],
                transition.symbol().cloned(),
                state_of(transition.to()),
                transition.data().clone(),
            );
        }
    }

    if let Some(initial) = automaton.start_states().first() {
        result.add_start(state_of(*initial));
    }

    debug!(
        "Minimized {} states into {} states",
        automaton.num_of_states(),
        result.num_of_states()
    );
    debug!("Time minimize: {:.3}s", start.elapsed().as_secs_f64());

    debug_assert!(
        result.is_deterministic(),
        "The minimized automaton is not deterministic: {:?}",
        result.ensure_deterministic()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use automata_fsa::random_deterministic_automaton;
    use automata_utilities::random_test;
    use test_log::test;

    use super::*;

    #[test]
    fn test_minimize_merges_equivalent_states() {
        // Two copies of a loop on a, where both copies are final.
        let mut automaton: Automaton<char, usize, usize> = Automaton::new();
        let s0 = automaton.add_state(0);
        let s1 = automaton.add_state(1);
        let s2 = automaton.add_state(2);

        automaton.add_transition(s0, Some('a'), s1, 10);
        automaton.add_transition(s1, Some('a'), s2, 11);
        automaton.add_transition(s2, Some('a'), s1, 12);
        automaton.add_start(s0);
        automaton.add_final(s0);
        automaton.add_final(s1);
        automaton.add_final(s2);

        let result = minimize(automaton).unwrap();
        assert_eq!(result.num_of_states(), 1);
        assert_eq!(result.num_of_transitions(), 1);
        assert_eq!(result.num_of_final_states(), 1);

        let start = result.start_states()[0];
        assert_eq!(result.transition(start, &'a'), start);
    }

    #[test]
    fn test_minimize_distinguishes_states() {
        // Accepts exactly the word a b.
        let mut automaton: Automaton<char> = Automaton::new();
        let s0 = automaton.add_state(());
        let s1 = automaton.add_state(());
        let s2 = automaton.add_state(());
        let dead = automaton.add_state(());

        automaton.add_transition(s0, Some('a'), s1, ());
        automaton.add_transition(s1, Some('b'), s2, ());
        automaton.add_transition(s1, Some('a'), dead, ());
        automaton.add_start(s0);
        automaton.add_final(s2);

        let result = minimize(automaton).unwrap();
        assert_eq!(result.num_of_states(), 3);
        assert_eq!(result.num_of_transitions(), 2);

        let start = result.start_states()[0];
        assert!(result.is_final(result.transition_word(start, &['a', 'b'])));
        assert_eq!(result.transition_word(start, &['a', 'a']), result.reject());
    }

    #[test]
    fn test_minimize_rejects_nondeterministic() {
        let mut automaton: Automaton<char> = Automaton::new();
        let s0 = automaton.add_state(());
        automaton.add_transition(s0, None, s0, ());

        assert_eq!(
            minimize(automaton).unwrap_err(),
            AutomatonError::EpsilonTransitions(1)
        );
    }

    #[test]
    fn test_minimize_empty_language() {
        let mut automaton: Automaton<char> = Automaton::new();
        let s0 = automaton.add_state(());
        automaton.add_transition(s0, Some('a'), s0, ());
        automaton.add_start(s0);

        let result = minimize(automaton).unwrap();
        assert_eq!(result.num_of_states(), 0);
        assert!(result.start_states().is_empty());
    }

    #[test]
    fn test_random_minimize_idempotent() {
        random_test(100, |rng| {
            let automaton = random_deterministic_automaton(rng, 10, 2);

            let minimized = minimize(automaton).unwrap();
            assert!(minimized.num_of_states() <= 10);

            let again = minimize(minimized.clone()).unwrap();
            assert_eq!(again.num_of_states(), minimized.num_of_states());
            assert_eq!(again.num_of_transitions(), minimized.num_of_transitions());
        });
    }
}
