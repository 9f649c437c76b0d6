use std::mem;

use super::state_arena::StateId;
use super::symbol::{Symbol, SymbolPolicy};

/// The goto edges leaving one state. Doesn't allocate until there are at least two.
///
/// Edges are kept in insertion order; the position of an edge is what a child's
/// parent link records, so removal shifts later edges down and the caller fixes
/// up their children.
#[derive(Clone, Debug, Default)]
pub enum Transitions<S> {
    /// No edges.
    #[default]
    None,
    /// Exactly one edge (symbol, target).
    One((S, StateId)),
    /// Two or more edges stored in a vector.
    Many(Vec<(S, StateId)>),
}

impl<S: Symbol> Transitions<S> {
    /// Gets the edge at the specified position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<(&S, StateId)> {
        match self {
            Transitions::None => None,
            Transitions::One((symbol, target)) => (index == 0).then_some((symbol, *target)),
            Transitions::Many(edges) => edges.get(index).map(|(s, t)| (s, *t)),
        }
    }

    /// Finds the edge whose stored symbol accepts `symbol` under `policy`.
    ///
    /// Returns its position and target.
    #[inline]
    pub fn find<P: SymbolPolicy<S>>(&self, policy: &P, symbol: &S) -> Option<(usize, StateId)> {
        match self {
            Transitions::None => None,
            Transitions::One((stored, target)) => policy.eq(stored, symbol).then_some((0, *target)),
            Transitions::Many(edges) => {
                // Unrolling by 2 lets both comparisons issue together; a plain
                // scan is kept because the alphabet has no ordering to search by.
                let chunks = edges.chunks_exact(2);
                let remainder = chunks.remainder();
                let mut base = 0;
                for chunk in chunks {
                    if policy.eq(&chunk[0].0, symbol) {
                        return Some((base, chunk[0].1));
                    }
                    if policy.eq(&chunk[1].0, symbol) {
                        return Some((base + 1, chunk[1].1));
                    }
                    base += 2;
                }
                for (offset, (stored, target)) in remainder.iter().enumerate() {
                    if policy.eq(stored, symbol) {
                        return Some((base + offset, *target));
                    }
                }
                None
            }
        }
    }

    /// Appends an edge and returns its position.
    pub fn push(&mut self, symbol: S, target: StateId) -> usize {
        match mem::take(self) {
            Transitions::None => {
                *self = Transitions::One((symbol, target));
                0
            }
            Transitions::One(first) => {
                *self = Transitions::Many(vec![first, (symbol, target)]);
                1
            }
            Transitions::Many(mut edges) => {
                edges.push((symbol, target));
                let position = edges.len() - 1;
                *self = Transitions::Many(edges);
                position
            }
        }
    }

    /// Removes the edge at `index`, returning it. Later edges shift down by one.
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> (S, StateId) {
        match mem::take(self) {
            Transitions::None => panic!("remove: no edge at position {index}"),
            Transitions::One(edge) => {
                assert!(index == 0, "remove: no edge at position {index}");
                edge
            }
            Transitions::Many(mut edges) => {
                let removed = edges.remove(index);
                *self = if edges.len() == 1 {
                    Transitions::One(edges.pop().expect("one edge left"))
                } else {
                    Transitions::Many(edges)
                };
                removed
            }
        }
    }

    /// Returns the number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Transitions::None => 0,
            Transitions::One(_) => 1,
            Transitions::Many(edges) => edges.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Transitions::None)
    }

    /// Returns an iterator over all edges, in position order.
    #[inline]
    pub fn iter(&self) -> EdgeIter<'_, S> {
        EdgeIter {
            transitions: self,
            index: 0,
        }
    }

    /// Takes every edge out, leaving no edges behind.
    pub fn take_all(&mut self) -> Vec<(S, StateId)> {
        match mem::take(self) {
            Transitions::None => Vec::new(),
            Transitions::One(edge) => vec![edge],
            Transitions::Many(edges) => edges,
        }
    }
}

/// An iterator over the edges of a state.
#[derive(Clone)]
pub struct EdgeIter<'a, S> {
    transitions: &'a Transitions<S>,
    index: usize,
}

impl<'a, S: Symbol> Iterator for EdgeIter<'a, S> {
    type Item = (&'a S, StateId);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let edge = self.transitions.get(self.index)?;
        self.index += 1;
        Some(edge)
    }

    /// Since we know the exact size, we can do better than the default implementation.
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.transitions.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<S: Symbol> ExactSizeIterator for EdgeIter<'_, S> {}
