use std::hash::Hash;
use std::time::Instant;

use automata_fsa::epsilon_closures;
use automata_fsa::Automaton;
use automata_fsa::StateId;
use automata_fsa::StateSet;
use indexmap::IndexMap;
use indexmap::IndexSet;
use log::debug;
use log::trace;
use rustc_hash::FxBuildHasher;
use rustc_hash::FxHashMap;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Receives the states and transitions of the deterministic automaton that is
/// computed by [determinize_with].
pub trait SubsetReporter<Symbol> {
    /// Called once for every discovered set of states, before any transition
    /// that involves it.
    fn report_state(&mut self, set: &StateSet, is_start: bool);

    /// Called once for every transition between two discovered sets.
    fn report_transition(&mut self, from: &StateSet, symbol: &Symbol, to: &StateSet);
}

/// Forwards the reports to two closures.
struct ClosureReporter<S, T> {
    report_state: S,
    report_transition: T,
}

impl<Symbol, S, T> SubsetReporter<Symbol> for ClosureReporter<S, T>
where
    S: FnMut(&StateSet, bool),
    T: FnMut(&StateSet, &Symbol, &StateSet),
{
    fn report_state(&mut self, set: &StateSet, is_start: bool) {
        (self.report_state)(set, is_start)
    }

    fn report_transition(&mut self, from: &StateSet, symbol: &Symbol, to: &StateSet) {
        (self.report_transition)(from, symbol, to)
    }
}

/// Performs the subset construction on the given automaton, reporting the
/// deterministic automaton through the two closures. See [determinize_with].
pub fn determinize<Symbol, StateData, TransitionData, S, T>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
    report_state: S,
    report_transition: T,
) where
    Symbol: Clone + Eq + Hash,
    S: FnMut(&StateSet, bool),
    T: FnMut(&StateSet, &Symbol, &StateSet),
{
    determinize_with(
        automaton,
        &mut ClosureReporter {
            report_state,
            report_transition,
        },
    );
}

/// Performs the subset construction on the given automaton, which can have
/// epsilon transitions and multiple start states.
///
/// The start set, the union of the epsilon closures of all start states, is
/// always reported first, even when it is empty. Every other set is reported
/// when it is first reached. Nothing is reported for an automaton without
/// states.
pub fn determinize_with<Symbol, StateData, TransitionData, R>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
    reporter: &mut R,
) where
    Symbol: Clone + Eq + Hash,
    R: SubsetReporter<Symbol> + ?Sized,
{
    if automaton.num_of_states() == 0 {
        return;
    }

    let start = Instant::now();
    let closures = epsilon_closures(automaton);

    let initial = StateSet::union_of(automaton.start_states().iter().map(|state| &closures[state]));
    reporter.report_state(&initial, true);

    // The insertion order of the discovered sets is the work list.
    let mut discovered: FxIndexSet<StateSet> = FxIndexSet::default();
    discovered.insert(initial);

    let mut index = 0;
    while index < discovered.len() {
        let current = discovered[index].clone();
        trace!("Expanding {current:?}");

        // Group the closures of the targets by their symbol, in the order in
        // which the symbols are found.
        let mut successors: FxIndexMap<&Symbol, Vec<&StateSet>> = FxIndexMap::default();
        for state in &current {
            for transition in automaton.outgoing(state) {
                let transition = automaton.get_transition(*transition);
                if let Some(symbol) = transition.symbol() {
                    successors.entry(symbol).or_default().push(&closures[&transition.to()]);
                }
            }
        }

        for (symbol, targets) in successors {
            let (target, is_new) = discovered.insert_full(StateSet::union_of(targets));
            if is_new {
                trace!("Discovered {:?}", discovered[target]);
                reporter.report_state(&discovered[target], false);
            }

            reporter.report_transition(&current, symbol, &discovered[target]);
        }

        index += 1;
    }

    debug!(
        "Determinized {} states into {} sets of states",
        automaton.num_of_states(),
        discovered.len()
    );
    debug!("Time determinize: {:.3}s", start.elapsed().as_secs_f64());
}

/// Builds the deterministic automaton whose states are labelled by the sets of
/// states of the original automaton.
struct AutomatonBuilder<'a, Symbol, StateData, TransitionData> {
    automaton: &'a Automaton<Symbol, StateData, TransitionData>,
    result: Automaton<Symbol, StateSet>,
    states: FxHashMap<StateSet, StateId>,
}

impl<Symbol, StateData, TransitionData> SubsetReporter<Symbol>
    for AutomatonBuilder<'_, Symbol, StateData, TransitionData>
where
    Symbol: Clone + Eq + Hash,
{
    fn report_state(&mut self, set: &StateSet, is_start: bool) {
        let state = self.result.add_state(set.clone());

        if is_start {
            self.result.add_start(state);
        }

        if set.iter().any(|member| self.automaton.is_final(member)) {
            self.result.add_final(state);
        }

        self.states.insert(set.clone(), state);
    }

    fn report_transition(&mut self, from: &StateSet, symbol: &Symbol, to: &StateSet) {
        self.result
            .add_transition(self.states[from], Some(symbol.clone()), self.states[to], ());
    }
}

/// Returns the deterministic automaton that accepts the same language as the
/// given automaton. Every state is labelled by the set of original states that
/// it represents, and it is final iff that set contains a final state.
pub fn determinize_automaton<Symbol, StateData, TransitionData>(
    automaton: &Automaton<Symbol, StateData, TransitionData>,
) -> Automaton<Symbol, StateSet>
where
    Symbol: Clone + Eq + Hash,
{
    let mut builder = AutomatonBuilder {
        automaton,
        result: Automaton::new(),
        states: FxHashMap::default(),
    };

    determinize_with(automaton, &mut builder);

    debug_assert!(
        builder.result.is_deterministic(),
        "The result of the subset construction is not deterministic: {:?}",
        builder.result.ensure_deterministic()
    );
    builder.result
}
