use std::fmt;
use std::hash::Hash;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use log::trace;
use rustc_hash::FxHashMap;

use crate::arena::Arena;
use crate::arena::Key;
use crate::AutomatonError;

/// Hands out a unique tag to every automaton, such that handles of one
/// automaton are rejected by another.
static AUTOMATON_COUNTER: AtomicU32 = AtomicU32::new(1);

/// A handle to a state of an [Automaton].
///
/// The handle stays valid until the state is removed, after which any use of
/// it is detected as a stale handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(Key);

/// A handle to a transition of an [Automaton].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(Key);

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{:?}", self.0)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{:?}", self.0)
    }
}

impl fmt::Debug for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{:?}", self.0)
    }
}

/// A transition `from --[symbol]-> to`, where a missing symbol denotes an
/// epsilon transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition<Symbol, TransitionData = ()> {
    from: StateId,
    symbol: Option<Symbol>,
    to: StateId,
    data: TransitionData,
}

impl<Symbol, TransitionData> Transition<Symbol, TransitionData> {
    /// Returns the source state.
    pub fn from(&self) -> StateId {
        self.from
    }

    /// Returns the symbol, or None for an epsilon transition.
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Returns the target state.
    pub fn to(&self) -> StateId {
        self.to
    }

    pub fn data(&self) -> &TransitionData {
        &self.data
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbol.is_none()
    }
}

#[derive(Clone)]
struct State<StateData> {
    data: StateData,

    /// The positions of this state in the start and final states.
    start_position: Option<usize>,
    final_position: Option<usize>,

    outgoing: Vec<TransitionId>,
    incoming: Vec<TransitionId>,
}

/// A transition together with its positions in the outgoing list of its
/// source, the incoming list of its target and its branch, such that it can be
/// unlinked in constant time.
#[derive(Clone)]
struct TransitionEntry<Symbol, TransitionData> {
    transition: Transition<Symbol, TransitionData>,
    outgoing_position: usize,
    incoming_position: usize,
    branch_position: usize,
}

/// Removes the element at `position` by moving the last element into its
/// place, and returns the moved element.
fn swap_remove_at(list: &mut Vec<TransitionId>, position: usize) -> Option<TransitionId> {
    list.swap_remove(position);
    list.get(position).copied()
}

/// A finite state automaton with optional data on its states and transitions.
///
/// Every automaton has a reject state, which has no transitions at all and is
/// never a start or final state. Looking up a transition that does not exist
/// results in the reject state. The reject state is not counted as one of the
/// states of the automaton.
///
/// The automaton is allowed to be nondeterministic: it can have multiple start
/// states, epsilon transitions and multiple transitions from the same state
/// with the same symbol. Transitions are indexed by their source state and
/// symbol.
///
/// A clone of an automaton accepts the same handles as the original.
#[derive(Clone)]
pub struct Automaton<Symbol, StateData = (), TransitionData = ()> {
    states: Arena<State<StateData>>,
    transitions: Arena<TransitionEntry<Symbol, TransitionData>>,

    reject: StateId,

    start_states: Vec<StateId>,
    final_states: Vec<StateId>,

    /// All the transitions indexed by their source state and symbol.
    branches: FxHashMap<(StateId, Option<Symbol>), Vec<TransitionId>>,

    num_of_epsilon_transitions: usize,
    num_of_ambiguous_transitions: usize,
}

impl<Symbol, StateData, TransitionData> Automaton<Symbol, StateData, TransitionData>
where
    Symbol: Clone + Eq + Hash,
{
    /// Creates an empty automaton, which only has the reject state.
    pub fn new() -> Automaton<Symbol, StateData, TransitionData> {
        let owner = AUTOMATON_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut states = Arena::new(owner);
        let reject = StateId(states.reserve());

        Automaton {
            states,
            transitions: Arena::new(owner),
            reject,
            start_states: Vec::new(),
            final_states: Vec::new(),
            branches: FxHashMap::default(),
            num_of_epsilon_transitions: 0,
            num_of_ambiguous_transitions: 0,
        }
    }

    /// Returns the reject state.
    pub fn reject(&self) -> StateId {
        self.reject
    }

    /// Adds a new state with the given data.
    pub fn add_state(&mut self, data: StateData) -> StateId {
        let id = StateId(self.states.insert(State {
            data,
            start_position: None,
            final_position: None,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }));

        trace!("Added state {id:?}");
        id
    }

    /// Removes the given state, after removing all transitions that start or
    /// end in it. Returns the data of the state.
    pub fn remove_state(&mut self, id: StateId) -> StateData {
        assert!(id != self.reject, "The reject state can not be removed");

        let state = self.state_mut(id);
        let outgoing = std::mem::take(&mut state.outgoing);
        let incoming = std::mem::take(&mut state.incoming);

        for transition in outgoing.into_iter().chain(incoming) {
            // A self loop occurs in both the outgoing and incoming transitions.
            if self.transitions.contains(transition.0) {
                self.detach_transition(transition, Some(id));
            }
        }

        self.remove_start(id);
        self.remove_final(id);

        trace!("Removed state {id:?}");
        match self.states.remove(id.0) {
            Some(state) => state.data,
            None => unreachable!("The state {id:?} was checked before"),
        }
    }

    /// Returns true iff the given handle refers to a state of this automaton,
    /// the reject state included.
    pub fn contains_state(&self, id: StateId) -> bool {
        id == self.reject || self.states.contains(id.0)
    }

    /// Adds a transition from `from` to `to` with the given symbol, where None
    /// denotes an epsilon transition.
    ///
    /// Adding a transition with the same source, symbol and target as an
    /// existing one returns the existing transition.
    pub fn add_transition(
        &mut self,
        from: StateId,
        symbol: Option<Symbol>,
        to: StateId,
        data: TransitionData,
    ) -> TransitionId {
        assert!(
            from != self.reject && to != self.reject,
            "Transitions can not be connected to the reject state"
        );
        self.state(from);
        self.state(to);

        let key = (from, symbol);
        if let Some(branch) = self.branches.get(&key) {
            let existing = branch
                .iter()
                .copied()
                .find(|existing| self.get_transition(*existing).to == to);
            if let Some(existing) = existing {
                return existing;
            }
        }

        let is_epsilon = key.1.is_none();
        let id = TransitionId(self.transitions.insert(TransitionEntry {
            transition: Transition {
                from,
                symbol: key.1.clone(),
                to,
                data,
            },
            outgoing_position: self.state(from).outgoing.len(),
            incoming_position: self.state(to).incoming.len(),
            branch_position: self.branches.get(&key).map_or(0, Vec::len),
        }));

        self.state_mut(from).outgoing.push(id);
        self.state_mut(to).incoming.push(id);

        let branch = self.branches.entry(key).or_default();
        if !branch.is_empty() {
            self.num_of_ambiguous_transitions += 1;
        }
        branch.push(id);

        if is_epsilon {
            self.num_of_epsilon_transitions += 1;
        }

        trace!("Added transition {id:?} from {from:?} to {to:?}");
        id
    }

    /// Removes the given transition and returns it.
    pub fn remove_transition(&mut self, id: TransitionId) -> Transition<Symbol, TransitionData> {
        self.detach_transition(id, None)
    }

    /// Removes the given transition from the arena, its endpoints and its
    /// branch. The lists of the `removed` state are already taken, so they are
    /// left alone.
    fn detach_transition(
        &mut self,
        id: TransitionId,
        removed: Option<StateId>,
    ) -> Transition<Symbol, TransitionData> {
        let TransitionEntry {
            transition,
            outgoing_position,
            incoming_position,
            branch_position,
        } = self.transitions.remove(id.0).unwrap_or_else(|| {
            panic!("Transition {id:?} was removed or belongs to another automaton")
        });

        if Some(transition.from) != removed {
            let outgoing = &mut self.state_mut(transition.from).outgoing;
            if let Some(moved) = swap_remove_at(outgoing, outgoing_position) {
                self.entry_mut(moved).outgoing_position = outgoing_position;
            }
        }

        if Some(transition.to) != removed {
            let incoming = &mut self.state_mut(transition.to).incoming;
            if let Some(moved) = swap_remove_at(incoming, incoming_position) {
                self.entry_mut(moved).incoming_position = incoming_position;
            }
        }

        let key = (transition.from, transition.symbol.clone());
        if let Some(branch) = self.branches.get_mut(&key) {
            if branch.len() > 1 {
                self.num_of_ambiguous_transitions -= 1;
            }

            let moved = swap_remove_at(branch, branch_position);
            if branch.is_empty() {
                self.branches.remove(&key);
            }

            if let Some(moved) = moved {
                self.entry_mut(moved).branch_position = branch_position;
            }
        }

        if transition.symbol.is_none() {
            self.num_of_epsilon_transitions -= 1;
        }

        trace!("Removed transition {id:?}");
        transition
    }

    /// Returns true iff the given handle refers to a transition of this automaton.
    pub fn contains_transition(&self, id: TransitionId) -> bool {
        self.transitions.contains(id.0)
    }

    /// Returns the transition for the given handle.
    pub fn get_transition(&self, id: TransitionId) -> &Transition<Symbol, TransitionData> {
        &self.entry(id).transition
    }

    /// Returns a mutable reference to the data of the given transition.
    pub fn transition_data_mut(&mut self, id: TransitionId) -> &mut TransitionData {
        &mut self.entry_mut(id).transition.data
    }

    /// Returns all transitions from `state` with the given symbol, where None
    /// selects the epsilon transitions.
    pub fn branch(&self, state: StateId, symbol: Option<&Symbol>) -> &[TransitionId] {
        if state == self.reject {
            return &[];
        }
        self.state(state);

        self.branches
            .get(&(state, symbol.cloned()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns some transition from `state` with the given symbol.
    pub fn find_transition(
        &self,
        state: StateId,
        symbol: Option<&Symbol>,
    ) -> Option<TransitionId> {
        self.branch(state, symbol).first().copied()
    }

    /// Returns the transition from `state` to `to` with the given symbol.
    pub fn find_transition_to(
        &self,
        state: StateId,
        symbol: Option<&Symbol>,
        to: StateId,
    ) -> Option<TransitionId> {
        self.branch(state, symbol)
            .iter()
            .copied()
            .find(|transition| self.get_transition(*transition).to == to)
    }

    /// Returns true iff there is a transition from `state` with the given symbol.
    pub fn exists_transition(&self, state: StateId, symbol: Option<&Symbol>) -> bool {
        !self.branch(state, symbol).is_empty()
    }

    /// Returns the state reached from `state` by the given symbol, or the
    /// reject state if there is no such transition. For a nondeterministic
    /// branch the target of its first transition is returned.
    pub fn transition(&self, state: StateId, symbol: &Symbol) -> StateId {
        self.find_transition(state, Some(symbol))
            .map_or(self.reject, |transition| self.get_transition(transition).to)
    }

    /// Returns the state reached from `state` by reading the given word. Once
    /// the reject state is reached the rest of the word is skipped.
    pub fn transition_word<'a, I>(&self, state: StateId, word: I) -> StateId
    where
        I: IntoIterator<Item = &'a Symbol>,
        Symbol: 'a,
    {
        let mut current = state;
        for symbol in word {
            if current == self.reject {
                break;
            }

            current = self.transition(current, symbol);
        }

        current
    }

    /// Marks the given state as a start state.
    pub fn add_start(&mut self, id: StateId) {
        assert!(id != self.reject, "The reject state can not be a start state");

        let position = self.start_states.len();
        let state = self.state_mut(id);
        if state.start_position.is_none() {
            state.start_position = Some(position);
            self.start_states.push(id);
        }
    }

    /// Removes the start mark from the given state.
    pub fn remove_start(&mut self, id: StateId) {
        if id == self.reject {
            return;
        }

        if let Some(position) = self.state_mut(id).start_position.take() {
            self.start_states.swap_remove(position);
            if let Some(moved) = self.start_states.get(position).copied() {
                self.state_mut(moved).start_position = Some(position);
            }
        }
    }

    /// Returns true iff the given state is a start state.
    pub fn is_start(&self, id: StateId) -> bool {
        id != self.reject && self.state(id).start_position.is_some()
    }

    /// Returns the start states in the order in which they were marked, where
    /// removing a mark moves the last start state into its place.
    pub fn start_states(&self) -> &[StateId] {
        &self.start_states
    }

    /// Marks the given state as a final state.
    pub fn add_final(&mut self, id: StateId) {
        assert!(id != self.reject, "The reject state can not be a final state");

        let position = self.final_states.len();
        let state = self.state_mut(id);
        if state.final_position.is_none() {
            state.final_position = Some(position);
            self.final_states.push(id);
        }
    }

    /// Removes the final mark from the given state.
    pub fn remove_final(&mut self, id: StateId) {
        if id == self.reject {
            return;
        }

        if let Some(position) = self.state_mut(id).final_position.take() {
            self.final_states.swap_remove(position);
            if let Some(moved) = self.final_states.get(position).copied() {
                self.state_mut(moved).final_position = Some(position);
            }
        }
    }

    /// Marks or unmarks the given state as a final state.
    pub fn set_final(&mut self, id: StateId, is_final: bool) {
        if is_final {
            self.add_final(id);
        } else {
            self.remove_final(id);
        }
    }

    /// Returns true iff the given state is a final state.
    pub fn is_final(&self, id: StateId) -> bool {
        id != self.reject && self.state(id).final_position.is_some()
    }

    /// Returns the final states in the order in which they were marked, where
    /// removing a mark moves the last final state into its place.
    pub fn final_states(&self) -> &[StateId] {
        &self.final_states
    }

    /// Returns the data of the given state.
    pub fn state_data(&self, id: StateId) -> &StateData {
        assert!(id != self.reject, "The reject state has no data");
        &self.state(id).data
    }

    /// Returns a mutable reference to the data of the given state.
    pub fn state_data_mut(&mut self, id: StateId) -> &mut StateData {
        assert!(id != self.reject, "The reject state has no data");
        &mut self.state_mut(id).data
    }

    /// Returns the outgoing transitions of the given state.
    pub fn outgoing(&self, id: StateId) -> &[TransitionId] {
        if id == self.reject {
            return &[];
        }

        &self.state(id).outgoing
    }

    /// Returns the incoming transitions of the given state.
    pub fn incoming(&self, id: StateId) -> &[TransitionId] {
        if id == self.reject {
            return &[];
        }

        &self.state(id).incoming
    }

    /// Iterate over all states, excluding the reject state.
    pub fn iter_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().map(|(key, _)| StateId(key))
    }

    /// Iterate over all transitions.
    pub fn iter_transitions(&self) -> impl Iterator<Item = TransitionId> + '_ {
        self.transitions.iter().map(|(key, _)| TransitionId(key))
    }

    /// Returns the number of states, excluding the reject state.
    pub fn num_of_states(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of transitions.
    pub fn num_of_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn num_of_start_states(&self) -> usize {
        self.start_states.len()
    }

    pub fn num_of_final_states(&self) -> usize {
        self.final_states.len()
    }

    pub fn num_of_epsilon_transitions(&self) -> usize {
        self.num_of_epsilon_transitions
    }

    /// Returns the number of transitions that share their source state and
    /// symbol with an earlier transition.
    pub fn num_of_ambiguous_transitions(&self) -> usize {
        self.num_of_ambiguous_transitions
    }

    /// Returns true iff the automaton has both a start and a final state.
    pub fn is_useful(&self) -> bool {
        !self.start_states.is_empty() && !self.final_states.is_empty()
    }

    /// Returns true iff there is at most one start state, there are no epsilon
    /// transitions and at most one transition for every state and symbol.
    pub fn is_deterministic(&self) -> bool {
        self.ensure_deterministic().is_ok()
    }

    /// Returns an error describing why the automaton is not deterministic.
    pub fn ensure_deterministic(&self) -> Result<(), AutomatonError> {
        if self.start_states.len() > 1 {
            return Err(AutomatonError::MultipleStartStates(self.start_states.len()));
        }

        if self.num_of_epsilon_transitions > 0 {
            return Err(AutomatonError::EpsilonTransitions(self.num_of_epsilon_transitions));
        }

        if self.num_of_ambiguous_transitions > 0 {
            return Err(AutomatonError::AmbiguousTransitions(self.num_of_ambiguous_transitions));
        }

        Ok(())
    }

    /// Removes all states and transitions. The reject state keeps its identity.
    pub fn clear(&mut self) {
        self.states.clear();
        self.transitions.clear();
        self.start_states.clear();
        self.final_states.clear();
        self.branches.clear();
        self.num_of_epsilon_transitions = 0;
        self.num_of_ambiguous_transitions = 0;
    }

    /// Removes all transitions.
    pub fn clear_transitions(&mut self) {
        let states: Vec<StateId> = self.iter_states().collect();
        for id in states {
            let state = self.state_mut(id);
            state.outgoing.clear();
            state.incoming.clear();
        }

        self.transitions.clear();
        self.branches.clear();
        self.num_of_epsilon_transitions = 0;
        self.num_of_ambiguous_transitions = 0;
    }

    /// Removes all start marks.
    pub fn clear_start(&mut self) {
        for id in std::mem::take(&mut self.start_states) {
            self.state_mut(id).start_position = None;
        }
    }

    /// Removes all final marks.
    pub fn clear_final(&mut self) {
        for id in std::mem::take(&mut self.final_states) {
            self.state_mut(id).final_position = None;
        }
    }

    /// Moves all states, transitions and marks of `other` into this automaton.
    /// Returns the mapping from the states of `other` to the new states.
    pub fn merge(
        &mut self,
        other: Automaton<Symbol, StateData, TransitionData>,
    ) -> FxHashMap<StateId, StateId> {
        let mut mapping: FxHashMap<StateId, StateId> = FxHashMap::default();
        mapping.insert(other.reject, self.reject);

        for (key, state) in other.states.into_entries() {
            let id = self.add_state(state.data);
            mapping.insert(StateId(key), id);
        }

        for (_, TransitionEntry { transition, .. }) in other.transitions.into_entries() {
            self.add_transition(
                mapping[&transition.from],
                transition.symbol,
                mapping[&transition.to],
                transition.data,
            );
        }

        for id in &other.start_states {
            self.add_start(mapping[id]);
        }

        for id in &other.final_states {
            self.add_final(mapping[id]);
        }

        mapping
    }

    /// Returns the state for the given handle, which must not be the reject state.
    fn state(&self, id: StateId) -> &State<StateData> {
        self.states
            .get(id.0)
            .unwrap_or_else(|| panic!("State {id:?} was removed or belongs to another automaton"))
    }

    fn state_mut(&mut self, id: StateId) -> &mut State<StateData> {
        self.states
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("State {id:?} was removed or belongs to another automaton"))
    }

    fn entry(&self, id: TransitionId) -> &TransitionEntry<Symbol, TransitionData> {
        self.transitions.get(id.0).unwrap_or_else(|| {
            panic!("Transition {id:?} was removed or belongs to another automaton")
        })
    }

    fn entry_mut(&mut self, id: TransitionId) -> &mut TransitionEntry<Symbol, TransitionData> {
        self.transitions.get_mut(id.0).unwrap_or_else(|| {
            panic!("Transition {id:?} was removed or belongs to another automaton")
        })
    }
}

impl<Symbol, StateData, TransitionData> Default for Automaton<Symbol, StateData, TransitionData>
where
    Symbol: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Symbol, StateData, TransitionData> fmt::Display
    for Automaton<Symbol, StateData, TransitionData>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print some information about the automaton.
        writeln!(f, "Number of states: {}", self.states.len())?;
        writeln!(f, "Number of transitions: {}", self.transitions.len())?;
        writeln!(f, "Number of epsilon transitions: {}", self.num_of_epsilon_transitions)?;
        write!(f, "Number of ambiguous transitions: {}", self.num_of_ambiguous_transitions)
    }
}

impl<Symbol: fmt::Debug, StateData, TransitionData> fmt::Debug
    for Automaton<Symbol, StateData, TransitionData>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)?;
        writeln!(f, "Start states: {:?}", self.start_states)?;
        writeln!(f, "Final states: {:?}", self.final_states)?;

        for (_, entry) in self.transitions.iter() {
            let transition = &entry.transition;
            match &transition.symbol {
                Some(symbol) => {
                    writeln!(f, "{:?} --[{:?}]-> {:?}", transition.from, symbol, transition.to)?
                }
                None => writeln!(f, "{:?} --[]-> {:?}", transition.from, transition.to)?,
            }
        }

        Ok(())
    }
}
