//!
//! A depth first traversal over an implicit graph. The graph is only given by
//! the seed vertices and an adjacency function, so the same traversal serves
//! forward and backward searches.
//!

use std::hash::Hash;
use std::ops::ControlFlow;

use log::trace;
use rustc_hash::FxHashSet;

/// Visits every vertex that can be reached from the `seeds` by following
/// `adjacency`, calling `report` exactly once for every visited vertex.
///
/// The traversal stops as soon as `report` returns [ControlFlow::Break], in
/// which case `Break` is also returned. No order among the successors of a
/// vertex is guaranteed.
pub fn traverse_depth_first<V, S, A, I, R>(
    seeds: S,
    mut adjacency: A,
    mut report: R,
) -> ControlFlow<()>
where
    V: Copy + Eq + Hash,
    S: IntoIterator<Item = V>,
    A: FnMut(V) -> I,
    I: IntoIterator<Item = V>,
    R: FnMut(V) -> ControlFlow<()>,
{
    // The stack for the depth first search.
    let mut stack: Vec<V> = Vec::new();

    // Keep track of the vertices that have been put on the stack.
    let mut visited: FxHashSet<V> = FxHashSet::default();

    for seed in seeds {
        if visited.insert(seed) {
            stack.push(seed);
        }
    }

    while let Some(vertex) = stack.pop() {
        if report(vertex).is_break() {
            trace!("Traversal stopped after {} vertices", visited.len());
            return ControlFlow::Break(());
        }

        for successor in adjacency(vertex) {
            if visited.insert(successor) {
                stack.push(successor);
            }
        }
    }

    trace!("Visited {} vertices", visited.len());
    ControlFlow::Continue(())
}

/// Returns the set of vertices reachable from the `seeds`, including the seeds
/// themselves.
pub fn reachable_vertices<V, S, A, I>(seeds: S, adjacency: A) -> FxHashSet<V>
where
    V: Copy + Eq + Hash,
    S: IntoIterator<Item = V>,
    A: FnMut(V) -> I,
    I: IntoIterator<Item = V>,
{
    let mut result = FxHashSet::default();
    let _ = traverse_depth_first(seeds, adjacency, |vertex| {
        result.insert(vertex);
        ControlFlow::Continue(())
    });

    result
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// A small graph given by adjacency lists, with a cycle 0 -> 1 -> 2 -> 0
    /// and a tail 2 -> 3, and a separate vertex 4 that points into the cycle.
    fn successors(vertex: usize) -> Vec<usize> {
        match vertex {
            0 => vec![1],
            1 => vec![2],
            2 => vec![0, 3],
            4 => vec![1],
            _ => vec![],
        }
    }

    #[test]
    fn test_traversal_visits_once() {
        let mut visits = vec![0; 5];
        let result = traverse_depth_first([0], successors, |vertex| {
            visits[vertex] += 1;
            ControlFlow::Continue(())
        });

        assert_eq!(result, ControlFlow::Continue(()));
        assert_eq!(visits, vec![1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_traversal_duplicate_seeds() {
        let reachable = reachable_vertices([3, 4, 3, 4], successors);

        let mut sorted: Vec<usize> = reachable.into_iter().collect();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_traversal_stops() {
        let mut visited = 0;
        let result = traverse_depth_first([0], successors, |vertex| {
            visited += 1;
            if vertex == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        assert_eq!(result, ControlFlow::Break(()));
        assert_eq!(visited, 3, "The traversal should stop at the third vertex of the path 0, 1, 2");
    }

    #[test]
    fn test_traversal_backwards() {
        // The reverse adjacency of the same graph.
        let predecessors = |vertex: usize| -> Vec<usize> {
            (0..5).filter(|other| successors(*other).contains(&vertex)).collect()
        };

        let reachable = reachable_vertices([0], predecessors);
        assert!(reachable.contains(&4));
        assert!(!reachable.contains(&3));
    }

    #[test]
    fn test_traversal_empty_seeds() {
        let reachable = reachable_vertices(Vec::<usize>::new(), successors);
        assert!(reachable.is_empty());
    }
}
