use std::fmt;

use itertools::Itertools;

use crate::StateId;

/// A set of states with structural equality and hashing. The states are kept
/// in a sorted vector without duplicates, so two sets with the same members
/// are equal and hash the same regardless of how they were built.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateSet {
    states: Vec<StateId>,
}

impl StateSet {
    /// Creates the empty set.
    pub fn new() -> StateSet {
        StateSet::default()
    }

    /// Creates a set containing a single state.
    pub fn singleton(state: StateId) -> StateSet {
        StateSet { states: vec![state] }
    }

    /// Returns the union of all the given sets.
    pub fn union_of<'a, I>(sets: I) -> StateSet
    where
        I: IntoIterator<Item = &'a StateSet>,
    {
        StateSet {
            states: sets
                .into_iter()
                .map(|set| set.states.iter().copied())
                .kmerge()
                .dedup()
                .collect(),
        }
    }

    /// Inserts the given state, returns false iff it was already present.
    pub fn insert(&mut self, state: StateId) -> bool {
        match self.states.binary_search(&state) {
            Ok(_) => false,
            Err(position) => {
                self.states.insert(position, state);
                true
            }
        }
    }

    /// Returns true iff the state is a member of this set.
    pub fn contains(&self, state: StateId) -> bool {
        self.states.binary_search(&state).is_ok()
    }

    /// Returns true iff every member of this set is a member of `other`.
    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.states.iter().all(|state| other.contains(*state))
    }

    /// Iterates over the members in their canonical order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().copied()
    }

    /// Returns the members as a sorted slice.
    pub fn as_slice(&self) -> &[StateId] {
        &self.states
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true iff the set has no members.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut states: Vec<StateId> = iter.into_iter().collect();
        states.sort_unstable();
        states.dedup();

        StateSet { states }
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        self.states.extend(iter);
        self.states.sort_unstable();
        self.states.dedup();
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = StateId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, StateId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter().copied()
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:?}}}", self.states.iter().format(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::hash::BuildHasher;

    use rustc_hash::FxBuildHasher;
    use test_log::test;

    use crate::Automaton;

    use super::*;

    #[test]
    fn test_state_set_structural() {
        let mut automaton: Automaton<char> = Automaton::new();
        let s0 = automaton.add_state(());
        let s1 = automaton.add_state(());
        let s2 = automaton.add_state(());

        let first: StateSet = [s2, s0, s1, s0].into_iter().collect();

        let mut second = StateSet::singleton(s1);
        assert!(second.insert(s2));
        assert!(second.insert(s0));
        assert!(!second.insert(s2));

        assert_eq!(first, second);
        assert_eq!(FxBuildHasher.hash_one(&first), FxBuildHasher.hash_one(&second));
        assert_eq!(first.len(), 3);
        assert!(first.contains(s1));
    }

    #[test]
    fn test_state_set_union() {
        let mut automaton: Automaton<char> = Automaton::new();
        let states: Vec<StateId> = (0..5).map(|_| automaton.add_state(())).collect();

        let first: StateSet = [states[0], states[3]].into_iter().collect();
        let second: StateSet = [states[3], states[1]].into_iter().collect();
        let empty = StateSet::new();

        let union = StateSet::union_of([&first, &empty, &second]);
        assert_eq!(union, [states[0], states[1], states[3]].into_iter().collect::<StateSet>());
        assert!(first.is_subset(&union));
        assert!(!union.is_subset(&first));
        assert!(StateSet::union_of([]).is_empty());
    }
}
