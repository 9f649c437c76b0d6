//! The goto store: a trie of states reachable from the root by symbol edges.
//!
//! Ownership is a tree: the arena owns every state, each non-root state hangs off
//! exactly one parent edge. Parent links are plain handles used only to rebuild a
//! keyword from its terminal state.

use smallvec::SmallVec;

use super::state_arena::{StateArena, StateId};
use super::symbol::{Symbol, SymbolPolicy};
use super::transitions::Transitions;

/// Back-reference from a state to the edge that reaches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ParentLink {
    pub state: StateId,
    /// Position of the edge inside the parent's transitions.
    pub edge: usize,
}

/// Registration data held by a terminal state.
#[derive(Debug)]
pub(crate) struct Terminal<V> {
    pub rank: usize,
    pub value: V,
}

#[derive(Debug)]
pub(crate) struct State<S, V> {
    pub transitions: Transitions<S>,
    pub parent: Option<ParentLink>,
    /// Set iff this exact prefix is a registered keyword.
    pub terminal: Option<Terminal<V>>,
}

impl<S, V> State<S, V> {
    fn new(parent: Option<ParentLink>) -> Self {
        State {
            transitions: Transitions::None,
            parent,
            terminal: None,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

/// Outcome of [`Trie::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Insertion {
    Inserted { state: StateId, new_states: usize },
    AlreadyPresent,
}

pub(crate) struct Trie<S, V> {
    states: StateArena<State<S, V>>,
}

impl<S: Symbol, V> Trie<S, V> {
    pub fn new() -> Self {
        let mut states = StateArena::new();
        let root = states.alloc(State::new(None));
        debug_assert!(root.is_root());
        Trie { states }
    }

    #[inline]
    pub fn state(&self, id: StateId) -> &State<S, V> {
        &self.states[id]
    }

    /// Live states, root included.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Upper bound on live handle indices, for tables indexed by state.
    pub fn slot_count(&self) -> usize {
        self.states.slot_count()
    }

    /// Follows edges from the root for as long as `keyword` allows.
    ///
    /// Returns the deepest state reached and how many symbols were consumed.
    pub fn walk<P: SymbolPolicy<S>>(&self, policy: &P, keyword: &[S]) -> (StateId, usize) {
        let mut current = StateId::ROOT;
        for (consumed, symbol) in keyword.iter().enumerate() {
            match self.states[current].transitions.find(policy, symbol) {
                Some((_, next)) => current = next,
                None => return (current, consumed),
            }
        }
        (current, keyword.len())
    }

    /// Returns the terminal state spelling exactly `keyword`, if registered.
    pub fn find<P: SymbolPolicy<S>>(&self, policy: &P, keyword: &[S]) -> Option<StateId> {
        if keyword.is_empty() {
            return None;
        }
        let (state, consumed) = self.walk(policy, keyword);
        (consumed == keyword.len() && self.states[state].is_terminal()).then_some(state)
    }

    /// Adds the missing suffix of `keyword` to the trie and marks its last state terminal.
    ///
    /// If the keyword is already registered, nothing changes and `value` is dropped.
    pub fn insert<P: SymbolPolicy<S>>(
        &mut self,
        policy: &P,
        keyword: &[S],
        rank: usize,
        value: V,
    ) -> Insertion {
        debug_assert!(!keyword.is_empty());
        let (mut current, consumed) = self.walk(policy, keyword);
        if consumed == keyword.len() && self.states[current].is_terminal() {
            return Insertion::AlreadyPresent;
        }

        for symbol in &keyword[consumed..] {
            let child = self.states.alloc(State::new(None));
            let edge = self.states[current]
                .transitions
                .push(policy.copy(symbol), child);
            self.states[child].parent = Some(ParentLink {
                state: current,
                edge,
            });
            current = child;
        }

        self.states[current].terminal = Some(Terminal { rank, value });
        Insertion::Inserted {
            state: current,
            new_states: keyword.len() - consumed,
        }
    }

    /// Unmarks `keyword` and prunes states that no longer lead to any keyword.
    ///
    /// Returns the registration data that was removed together with the number
    /// of pruned states, or `None` if the keyword was not registered.
    pub fn remove<P: SymbolPolicy<S>>(
        &mut self,
        policy: &P,
        keyword: &[S],
    ) -> Option<(Terminal<V>, usize)> {
        let mut last = self.find(policy, keyword)?;
        let terminal = self.states[last].terminal.take()?;

        // Bounded by the keyword length: each step climbs one level.
        let mut pruned = 0;
        while !last.is_root()
            && !self.states[last].is_terminal()
            && self.states[last].transitions.is_empty()
        {
            let state = self.states.release(last);
            pruned += 1;
            let link = state.parent.expect("non-root state has a parent");
            let parent = &mut self.states[link.state].transitions;
            let (symbol, removed) = parent.remove(link.edge);
            debug_assert_eq!(removed, last);
            policy.destroy(symbol);

            // Edges after the removed one moved down by one position.
            let shifted: SmallVec<[StateId; 8]> =
                parent.iter().skip(link.edge).map(|(_, child)| child).collect();
            for (offset, child) in shifted.into_iter().enumerate() {
                if let Some(p) = self.states[child].parent.as_mut() {
                    p.edge = link.edge + offset;
                }
            }
            last = link.state;
        }
        Some((terminal, pruned))
    }

    /// Rebuilds the keyword spelled by the path from the root to `state`.
    pub fn keyword_of(&self, state: StateId) -> Vec<S> {
        let mut symbols = Vec::new();
        let mut current = state;
        while let Some(link) = self.states[current].parent {
            let (symbol, _) = self.states[link.state]
                .transitions
                .get(link.edge)
                .expect("parent link points at an existing edge");
            symbols.push(symbol.clone());
            current = link.state;
        }
        symbols.reverse();
        symbols
    }

    /// Depth-first walk calling `visit` once per terminal state, with the path symbols.
    pub fn for_each_terminal(&self, mut visit: impl FnMut(&[S], &Terminal<V>)) {
        let mut path: Vec<S> = Vec::new();
        // (state, next edge to explore)
        let mut stack: Vec<(StateId, usize)> = vec![(StateId::ROOT, 0)];
        while let Some(&(id, next)) = stack.last() {
            match self.states[id].transitions.get(next) {
                Some((symbol, child)) => {
                    let top = stack.len() - 1;
                    stack[top].1 += 1;
                    path.push(symbol.clone());
                    if let Some(terminal) = &self.states[child].terminal {
                        visit(&path, terminal);
                    }
                    stack.push((child, 0));
                }
                None => {
                    stack.pop();
                    path.pop();
                }
            }
        }
    }

    /// Empties the trie, handing every stored symbol to `policy.destroy`.
    ///
    /// Values are dropped along with their states.
    pub fn clear<P: SymbolPolicy<S>>(&mut self, policy: &P) {
        for mut state in self.states.drain() {
            for (symbol, _) in state.transitions.take_all() {
                policy.destroy(symbol);
            }
        }
        let root = self.states.alloc(State::new(None));
        debug_assert!(root.is_root());
    }

    /// Iterates over live states in slot order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State<S, V>)> {
        self.states.iter()
    }

    /// Checks parent links, edge positions and leaf marking; used by tests.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for (id, state) in self.states.iter() {
            match state.parent {
                None => assert!(id.is_root(), "{id:?} has no parent"),
                Some(link) => {
                    let (_, child) = self.states[link.state]
                        .transitions
                        .get(link.edge)
                        .expect("parent edge exists");
                    assert_eq!(child, id, "parent edge of {id:?} points elsewhere");
                    assert!(
                        state.is_terminal() || !state.transitions.is_empty(),
                        "{id:?} is a dead leaf"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::symbol::Exact;
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn trie_with(words: &[&str]) -> Trie<char, usize> {
        let mut trie = Trie::new();
        for (rank, word) in words.iter().enumerate() {
            trie.insert(&Exact, &chars(word), rank, rank * 10);
        }
        trie
    }

    #[test]
    fn insert_shares_prefixes() {
        let trie = trie_with(&["he", "hers", "his"]);
        // root, h, e, r, s, i, s
        assert_eq!(trie.state_count(), 7);
        trie.assert_consistent();
    }

    #[test]
    fn insert_reports_new_states() {
        let mut trie: Trie<char, ()> = Trie::new();
        let first = trie.insert(&Exact, &chars("car"), 0, ());
        assert!(matches!(first, Insertion::Inserted { new_states: 3, .. }));
        let second = trie.insert(&Exact, &chars("cart"), 1, ());
        assert!(matches!(second, Insertion::Inserted { new_states: 1, .. }));
        let prefix = trie.insert(&Exact, &chars("ca"), 2, ());
        assert!(matches!(prefix, Insertion::Inserted { new_states: 0, .. }));
        assert_eq!(trie.insert(&Exact, &chars("car"), 3, ()), Insertion::AlreadyPresent);
    }

    #[test]
    fn duplicate_insert_keeps_rank_and_value() {
        let mut trie = trie_with(&["abc"]);
        trie.insert(&Exact, &chars("abc"), 9, 99);
        let state = trie.find(&Exact, &chars("abc")).unwrap();
        let terminal = trie.state(state).terminal.as_ref().unwrap();
        assert_eq!(terminal.rank, 0);
        assert_eq!(terminal.value, 0);
    }

    #[test]
    fn find_requires_terminal() {
        let trie = trie_with(&["hers"]);
        assert!(trie.find(&Exact, &chars("hers")).is_some());
        assert!(trie.find(&Exact, &chars("her")).is_none());
        assert!(trie.find(&Exact, &chars("herself")).is_none());
        assert!(trie.find(&Exact, &[]).is_none());
    }

    #[test]
    fn remove_leaf_prunes_up_to_branch() {
        let mut trie = trie_with(&["hers", "his"]);
        let (terminal, pruned) = trie.remove(&Exact, &chars("hers")).unwrap();
        assert_eq!(terminal.rank, 0);
        assert_eq!(pruned, 3);
        // root, h, i, s
        assert_eq!(trie.state_count(), 4);
        trie.assert_consistent();
        assert!(trie.find(&Exact, &chars("his")).is_some());
    }

    #[test]
    fn remove_prefix_keeps_longer_keyword() {
        let mut trie = trie_with(&["a", "ab"]);
        let (_, pruned) = trie.remove(&Exact, &chars("a")).unwrap();
        assert_eq!(pruned, 0);
        assert!(trie.find(&Exact, &chars("a")).is_none());
        assert!(trie.find(&Exact, &chars("ab")).is_some());
        trie.assert_consistent();
    }

    #[test]
    fn remove_stops_at_terminal_ancestor() {
        let mut trie = trie_with(&["he", "hers"]);
        let (_, pruned) = trie.remove(&Exact, &chars("hers")).unwrap();
        assert_eq!(pruned, 2);
        assert!(trie.find(&Exact, &chars("he")).is_some());
        assert_eq!(trie.state_count(), 3);
    }

    #[test]
    fn remove_everything_leaves_root() {
        let words = ["he", "she", "his", "hers"];
        let mut trie = trie_with(&words);
        for word in words {
            assert!(trie.remove(&Exact, &chars(word)).is_some());
            trie.assert_consistent();
        }
        assert_eq!(trie.state_count(), 1);
        assert!(trie.state(StateId::ROOT).transitions.is_empty());
    }

    #[test]
    fn remove_missing_keyword() {
        let mut trie = trie_with(&["hers"]);
        assert!(trie.remove(&Exact, &chars("her")).is_none());
        assert!(trie.remove(&Exact, &chars("hex")).is_none());
        assert_eq!(trie.state_count(), 5);
    }

    #[test]
    fn removal_fixes_up_sibling_edge_positions() {
        let mut trie = trie_with(&["xa", "xb", "xc", "xd"]);
        trie.remove(&Exact, &chars("xa")).unwrap();
        trie.assert_consistent();
        let d = trie.find(&Exact, &chars("xd")).unwrap();
        assert_eq!(trie.keyword_of(d), chars("xd"));
        trie.remove(&Exact, &chars("xc")).unwrap();
        let d = trie.find(&Exact, &chars("xd")).unwrap();
        assert_eq!(trie.keyword_of(d), chars("xd"));
        trie.assert_consistent();
    }

    #[test]
    fn keyword_of_walks_parent_links() {
        let trie = trie_with(&["ushers", "us"]);
        let state = trie.find(&Exact, &chars("ushers")).unwrap();
        assert_eq!(trie.keyword_of(state), chars("ushers"));
        assert!(trie.keyword_of(StateId::ROOT).is_empty());
    }

    #[test]
    fn for_each_terminal_visits_every_keyword_once() {
        let words = ["he", "she", "his", "hers", "h"];
        let trie = trie_with(&words);
        let mut seen = Vec::new();
        trie.for_each_terminal(|symbols, terminal| {
            seen.push((symbols.iter().collect::<String>(), terminal.rank));
        });
        seen.sort();
        let mut expected: Vec<(String, usize)> =
            words.iter().enumerate().map(|(r, w)| (w.to_string(), r)).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn clear_destroys_every_stored_symbol() {
        use std::cell::Cell;

        struct Counting<'a>(&'a Cell<usize>);
        impl SymbolPolicy<char> for Counting<'_> {
            fn eq(&self, stored: &char, incoming: &char) -> bool {
                stored == incoming
            }
            fn copy(&self, symbol: &char) -> char {
                *symbol
            }
            fn destroy(&self, _symbol: char) {
                self.0.set(self.0.get() + 1);
            }
        }

        let destroyed = Cell::new(0);
        let policy = Counting(&destroyed);
        let mut trie: Trie<char, ()> = Trie::new();
        trie.insert(&policy, &chars("he"), 0, ());
        trie.insert(&policy, &chars("hers"), 1, ());
        trie.remove(&policy, &chars("hers"));
        assert_eq!(destroyed.get(), 2);
        trie.clear(&policy);
        assert_eq!(destroyed.get(), 4);
        assert_eq!(trie.state_count(), 1);
    }
}
