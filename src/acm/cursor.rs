//! Scanning: cursors over an automaton and the matches they report.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use super::automaton::Automaton;
use super::error::AcmError;
use super::failure::FailLinks;
use super::state_arena::StateId;
use super::symbol::{Symbol, SymbolPolicy};

/// A registered keyword recovered from the state a cursor stopped at.
#[derive(Clone, PartialEq, Eq)]
pub struct Match<'a, S, V> {
    /// The keyword's symbols, as stored in the automaton.
    pub keyword: Vec<S>,
    /// Insertion rank given to the keyword when it was registered.
    pub rank: usize,
    /// Value attached at registration.
    pub value: &'a V,
}

impl<S, V> Match<'_, S, V> {
    /// Number of symbols in the matched keyword.
    #[inline]
    pub fn len(&self) -> usize {
        self.keyword.len()
    }

    /// True if the keyword has no symbols; never the case for a registered keyword.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyword.is_empty()
    }
}

impl<S: fmt::Debug, V: fmt::Debug> fmt::Debug for Match<'_, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("keyword", &self.keyword)
            .field("rank", &self.rank)
            .field("value", self.value)
            .finish()
    }
}

/// Caller-owned position in an automaton.
///
/// Created at the root by [`Automaton::cursor`]. Any number of cursors can scan
/// the same automaton at once, from one thread or many; each only moves itself.
///
/// ```
/// use libacm::acm::Automaton;
///
/// let mut acm: Automaton<char> = Automaton::new();
/// for kw in ["he", "she", "his", "hers"] {
///     acm.register(kw);
/// }
///
/// let mut cursor = acm.cursor();
/// let mut found = Vec::new();
/// for (i, ch) in "ushers".chars().enumerate() {
///     for m in (0..cursor.advance(ch)).map(|k| cursor.get_match(k).unwrap()) {
///         found.push((i, m.keyword.iter().collect::<String>()));
///     }
/// }
/// assert_eq!(
///     found,
///     [(3, "she".to_string()), (3, "he".to_string()), (5, "hers".to_string())]
/// );
/// ```
pub struct Cursor<'a, S: Symbol, V, P: SymbolPolicy<S>> {
    automaton: &'a Automaton<S, V, P>,
    state: StateId,
    // The borrow on `automaton` rules out edits, so once fetched this stays current.
    links: Option<Arc<FailLinks>>,
}

impl<'a, S: Symbol, V, P: SymbolPolicy<S>> Cursor<'a, S, V, P> {
    pub(crate) fn new(automaton: &'a Automaton<S, V, P>) -> Self {
        Cursor {
            automaton,
            state: StateId::ROOT,
            links: None,
        }
    }

    /// Moves back to the root, to start scanning a fresh sequence.
    #[inline]
    pub fn reset(&mut self) {
        self.state = StateId::ROOT;
    }

    /// True if no keyword prefix is pending at the current position.
    #[inline]
    pub fn is_at_root(&self) -> bool {
        self.state.is_root()
    }

    /// Consumes one input symbol and returns how many keywords end at it.
    ///
    /// The first call on a cursor brings the failure function up to date if the
    /// automaton was edited since it was last built.
    #[inline]
    pub fn advance(&mut self, symbol: impl Borrow<S>) -> usize {
        let automaton = self.automaton;
        let links = self.links.get_or_insert_with(|| automaton.fail_links());
        self.state = links.follow(
            automaton.trie(),
            automaton.policy(),
            self.state,
            symbol.borrow(),
        );
        links.output_count(self.state)
    }

    /// Number of keywords ending at the current position.
    #[inline]
    pub fn match_count(&self) -> usize {
        self.links
            .as_ref()
            .map_or(0, |links| links.output_count(self.state))
    }

    /// Recovers the `index`-th keyword ending at the current position.
    ///
    /// Index 0 is the longest such keyword; the rest follow by decreasing length.
    ///
    /// # Errors
    ///
    /// Returns [`AcmError::MatchIndexOutOfRange`] unless `index < self.match_count()`.
    pub fn get_match(&self, index: usize) -> Result<Match<'a, S, V>, AcmError> {
        let count = self.match_count();
        let out_of_range = AcmError::MatchIndexOutOfRange { index, count };
        let Some(links) = self.links.as_ref() else {
            return Err(out_of_range);
        };
        let terminal = links
            .nth_output(self.automaton.trie(), self.state, index)
            .ok_or(out_of_range)?;
        Ok(self.automaton.match_at(terminal))
    }

    /// Iterates over every keyword ending at the current position, longest first.
    pub fn matches(&self) -> Matches<'a, S, V, P> {
        let links = match &self.links {
            Some(links) => Arc::clone(links),
            None => self.automaton.fail_links(),
        };
        let remaining = links.output_count(self.state);
        Matches {
            automaton: self.automaton,
            links,
            next: Some(self.state),
            remaining,
        }
    }
}

impl<S: Symbol, V, P: SymbolPolicy<S>> Clone for Cursor<'_, S, V, P> {
    fn clone(&self) -> Self {
        Cursor {
            automaton: self.automaton,
            state: self.state,
            links: self.links.clone(),
        }
    }
}

impl<S: Symbol, V, P: SymbolPolicy<S>> fmt::Debug for Cursor<'_, S, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state)
            .field("match_count", &self.match_count())
            .finish()
    }
}

/// Iterator over the keywords ending at one cursor position. See [`Cursor::matches`].
pub struct Matches<'a, S: Symbol, V, P: SymbolPolicy<S>> {
    automaton: &'a Automaton<S, V, P>,
    links: Arc<FailLinks>,
    next: Option<StateId>,
    remaining: usize,
}

impl<'a, S: Symbol, V, P: SymbolPolicy<S>> Iterator for Matches<'a, S, V, P> {
    type Item = Match<'a, S, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (terminal, next) = self.links.next_output(self.automaton.trie(), self.next)?;
        self.next = next;
        self.remaining -= 1;
        Some(self.automaton.match_at(terminal))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<S: Symbol, V, P: SymbolPolicy<S>> ExactSizeIterator for Matches<'_, S, V, P> {}

/// One keyword occurrence found by [`Automaton::scan`].
#[derive(Clone, PartialEq, Eq)]
pub struct Hit<'a, S, V> {
    /// 0-based index of the input symbol the occurrence ends at.
    pub position: usize,
    /// The keyword that occurs there.
    pub matched: Match<'a, S, V>,
}

impl<S, V> Hit<'_, S, V> {
    /// 0-based index of the first input symbol of the occurrence.
    #[inline]
    pub fn start(&self) -> usize {
        self.position + 1 - self.matched.len()
    }
}

impl<S: fmt::Debug, V: fmt::Debug> fmt::Debug for Hit<'_, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hit")
            .field("position", &self.position)
            .field("matched", &self.matched)
            .finish()
    }
}

/// Iterator over every keyword occurrence in a haystack, overlapping ones included.
///
/// Occurrences come out by end position, and by decreasing length among those
/// ending at the same position.
pub struct Scan<'a, S: Symbol, V, P: SymbolPolicy<S>, I> {
    cursor: Cursor<'a, S, V, P>,
    haystack: I,
    position: usize,
    pending: Option<Matches<'a, S, V, P>>,
}

impl<'a, S: Symbol, V, P: SymbolPolicy<S>, I> Scan<'a, S, V, P, I> {
    pub(crate) fn new(automaton: &'a Automaton<S, V, P>, haystack: I) -> Self {
        Scan {
            cursor: automaton.cursor(),
            haystack,
            position: 0,
            pending: None,
        }
    }
}

impl<'a, S, V, P, I> Iterator for Scan<'a, S, V, P, I>
where
    S: Symbol,
    P: SymbolPolicy<S>,
    I: Iterator,
    I::Item: Borrow<S>,
{
    type Item = Hit<'a, S, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(matched) = self.pending.as_mut().and_then(Iterator::next) {
                return Some(Hit {
                    position: self.position - 1,
                    matched,
                });
            }
            self.pending = None;
            let symbol = self.haystack.next()?;
            self.position += 1;
            if self.cursor.advance(symbol) > 0 {
                self.pending = Some(self.cursor.matches());
            }
        }
    }
}
