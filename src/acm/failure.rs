//! Failure function: fail links and cumulative output counts.
//!
//! The table is derived from the trie and rebuilt wholesale after edits. It is
//! indexed by state handle, so it stays a flat vector even though the trie
//! itself is a tree of edge lists.

use std::collections::VecDeque;

use super::state_arena::StateId;
use super::symbol::{Symbol, SymbolPolicy};
use super::trie::Trie;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Link {
    /// `None` only for the root (and for unused slots).
    pub fail: Option<StateId>,
    /// Terminal states on the fail chain starting here, this state included.
    pub output_count: usize,
}

/// Fail link and output count of every live state.
#[derive(Debug, Default)]
pub(crate) struct FailLinks {
    links: Vec<Link>,
}

impl FailLinks {
    /// Table for a trie holding only the root: no fail link, nothing to output.
    pub fn empty() -> Self {
        FailLinks {
            links: vec![Link::default()],
        }
    }

    /// Breadth-first construction over the whole trie.
    ///
    /// Parents are dequeued before their children, and every fail target is
    /// strictly shallower than its source, so a target's count is final by the
    /// time a child adds it to its own.
    pub fn build<S: Symbol, V, P: SymbolPolicy<S>>(trie: &Trie<S, V>, policy: &P) -> Self {
        let mut links = vec![Link::default(); trie.slot_count()];
        for (id, state) in trie.states() {
            links[id.index()].output_count = usize::from(state.is_terminal());
        }
        let mut table = FailLinks { links };

        let mut queue = VecDeque::new();
        for (_, child) in trie.state(StateId::ROOT).transitions.iter() {
            table.links[child.index()].fail = Some(StateId::ROOT);
            queue.push_back(child);
        }

        while let Some(r) = queue.pop_front() {
            let r_fail = table.links[r.index()].fail;
            for (symbol, s) in trie.state(r).transitions.iter() {
                let fail = match r_fail {
                    Some(start) => table.follow(trie, policy, start, symbol),
                    None => StateId::ROOT,
                };
                debug_assert_ne!(fail, s);
                let inherited = table.links[fail.index()].output_count;
                let link = &mut table.links[s.index()];
                link.fail = Some(fail);
                link.output_count += inherited;
                queue.push_back(s);
            }
        }
        table
    }

    #[cfg(test)]
    pub fn get(&self, id: StateId) -> Link {
        self.links[id.index()]
    }

    #[inline]
    pub fn output_count(&self, id: StateId) -> usize {
        self.links[id.index()].output_count
    }

    /// Goto with fallback: takes the edge accepting `symbol`, falling back along fail
    /// links until one exists. The root loops to itself on any symbol it has no edge for.
    #[inline]
    pub fn follow<S: Symbol, V, P: SymbolPolicy<S>>(
        &self,
        trie: &Trie<S, V>,
        policy: &P,
        mut state: StateId,
        symbol: &S,
    ) -> StateId {
        loop {
            if let Some((_, next)) = trie.state(state).transitions.find(policy, symbol) {
                return next;
            }
            match self.links[state.index()].fail {
                Some(fail) => state = fail,
                None => return state,
            }
        }
    }

    /// First terminal state on the fail chain starting at `state`, paired with
    /// the state the chain continues from after it.
    pub fn next_output<S: Symbol, V>(
        &self,
        trie: &Trie<S, V>,
        mut state: Option<StateId>,
    ) -> Option<(StateId, Option<StateId>)> {
        while let Some(id) = state {
            let next = self.links[id.index()].fail;
            if trie.state(id).is_terminal() {
                return Some((id, next));
            }
            state = next;
        }
        None
    }

    /// The `index`-th terminal state on the fail chain starting at `state`, nearest first.
    pub fn nth_output<S: Symbol, V>(
        &self,
        trie: &Trie<S, V>,
        state: StateId,
        index: usize,
    ) -> Option<StateId> {
        if index >= self.output_count(state) {
            return None;
        }
        let mut remaining = index;
        let mut current = Some(state);
        while let Some(id) = current {
            if trie.state(id).is_terminal() {
                if remaining == 0 {
                    return Some(id);
                }
                remaining -= 1;
            }
            current = self.links[id.index()].fail;
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::super::symbol::Exact;
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn trie_with(words: &[&str]) -> Trie<char, ()> {
        let mut trie = Trie::new();
        for (rank, word) in words.iter().enumerate() {
            trie.insert(&Exact, &chars(word), rank, ());
        }
        trie
    }

    fn state(trie: &Trie<char, ()>, prefix: &str) -> StateId {
        let (id, consumed) = trie.walk(&Exact, &chars(prefix));
        assert_eq!(consumed, prefix.chars().count(), "{prefix} is not in the trie");
        id
    }

    #[test]
    fn fail_links_of_the_paper_example() {
        let trie = trie_with(&["he", "she", "his", "hers"]);
        let table = FailLinks::build(&trie, &Exact);

        assert_eq!(table.get(StateId::ROOT).fail, None);
        assert_eq!(table.get(state(&trie, "h")).fail, Some(StateId::ROOT));
        assert_eq!(table.get(state(&trie, "s")).fail, Some(StateId::ROOT));
        assert_eq!(table.get(state(&trie, "sh")).fail, Some(state(&trie, "h")));
        assert_eq!(table.get(state(&trie, "she")).fail, Some(state(&trie, "he")));
        assert_eq!(table.get(state(&trie, "his")).fail, Some(state(&trie, "s")));
        assert_eq!(table.get(state(&trie, "hers")).fail, Some(state(&trie, "s")));
        assert_eq!(table.get(state(&trie, "her")).fail, Some(StateId::ROOT));
    }

    #[test]
    fn output_counts_accumulate_along_fail_chain() {
        let trie = trie_with(&["he", "she", "e", "hers"]);
        let table = FailLinks::build(&trie, &Exact);
        assert_eq!(table.output_count(StateId::ROOT), 0);
        assert_eq!(table.output_count(state(&trie, "e")), 1);
        assert_eq!(table.output_count(state(&trie, "he")), 2);
        assert_eq!(table.output_count(state(&trie, "she")), 3);
        assert_eq!(table.output_count(state(&trie, "sh")), 0);
        assert_eq!(table.output_count(state(&trie, "hers")), 1);
    }

    #[test]
    fn follow_loops_at_root() {
        let trie = trie_with(&["ab"]);
        let table = FailLinks::build(&trie, &Exact);
        assert_eq!(table.follow(&trie, &Exact, StateId::ROOT, &'z'), StateId::ROOT);
        let a = state(&trie, "a");
        assert_eq!(table.follow(&trie, &Exact, StateId::ROOT, &'a'), a);
        // "a" has no edge on 'a', falls back to the root which does.
        assert_eq!(table.follow(&trie, &Exact, a, &'a'), a);
        assert_eq!(table.follow(&trie, &Exact, a, &'b'), state(&trie, "ab"));
    }

    #[test]
    fn nth_output_is_nearest_first() {
        let trie = trie_with(&["she", "he", "e"]);
        let table = FailLinks::build(&trie, &Exact);
        let she = state(&trie, "she");
        assert_eq!(table.nth_output(&trie, she, 0), Some(she));
        assert_eq!(table.nth_output(&trie, she, 1), Some(state(&trie, "he")));
        assert_eq!(table.nth_output(&trie, she, 2), Some(state(&trie, "e")));
        assert_eq!(table.nth_output(&trie, she, 3), None);
    }

    #[test]
    fn nth_output_skips_non_terminal_states() {
        let trie = trie_with(&["abcd", "bc", "c"]);
        let table = FailLinks::build(&trie, &Exact);
        // abc -> bc -> c
        let abc = state(&trie, "abc");
        assert_eq!(table.output_count(abc), 2);
        assert_eq!(table.nth_output(&trie, abc, 0), Some(state(&trie, "bc")));
        assert_eq!(table.nth_output(&trie, abc, 1), Some(state(&trie, "c")));
    }

    #[test]
    fn empty_trie_table() {
        let trie = trie_with(&[]);
        let table = FailLinks::build(&trie, &Exact);
        assert_eq!(table.get(StateId::ROOT), FailLinks::empty().get(StateId::ROOT));
        assert_eq!(table.follow(&trie, &Exact, StateId::ROOT, &'x'), StateId::ROOT);
    }

    #[test]
    fn rebuild_after_removal_drops_stale_counts() {
        let mut trie = trie_with(&["he", "she"]);
        let before = FailLinks::build(&trie, &Exact);
        assert_eq!(before.output_count(state(&trie, "she")), 2);
        trie.remove(&Exact, &chars("he"));
        let after = FailLinks::build(&trie, &Exact);
        assert_eq!(after.output_count(state(&trie, "she")), 1);
        assert_eq!(after.get(state(&trie, "sh")).fail, Some(StateId::ROOT));
    }
}
