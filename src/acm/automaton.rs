use std::borrow::Borrow;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::cursor::{Cursor, Match, Scan};
use super::error::AcmError;
use super::failure::FailLinks;
use super::keyword::{IntoKeyword, is_comment};
use super::state_arena::StateId;
use super::symbol::{Exact, Symbol, SymbolPolicy};
use super::trie::{Insertion, Trie};

/// An Aho-Corasick machine over keywords of `S` symbols, each carrying a `V` value.
///
/// Keywords can be registered and unregistered at any time. Edits only mark the
/// failure function stale; it is rebuilt once, by whichever scan needs it first.
/// Scanning borrows the automaton immutably, so it can be shared across threads
/// (`Automaton` is `Send + Sync` whenever `S`, `V` and `P` are).
///
/// # Examples
///
/// ```
/// use libacm::acm::Automaton;
///
/// let mut acm: Automaton<char, &str> = Automaton::new();
/// acm.register_with("he", "pronoun");
/// acm.register_with("hers", "possessive");
/// assert!(!acm.register_with("he", "ignored"));
/// assert_eq!(acm.keyword_count(), 2);
///
/// let found: Vec<(usize, &str)> = acm
///     .scan("ushers".chars())
///     .map(|hit| (hit.position, *hit.matched.value))
///     .collect();
/// assert_eq!(found, [(3, "pronoun"), (5, "possessive")]);
///
/// acm.unregister("he");
/// assert!(!acm.is_registered("he"));
/// assert_eq!(acm.scan("ushers".chars()).count(), 1);
/// ```
pub struct Automaton<S: Symbol, V = (), P: SymbolPolicy<S> = Exact> {
    trie: Trie<S, V>,
    policy: P,
    /// Rank for the next registration; never decremented.
    next_rank: usize,
    keyword_count: usize,
    /// Set by every edit, cleared once `links` matches the trie again.
    dirty: AtomicBool,
    rebuild_lock: Mutex<()>,
    links: ArcSwap<FailLinks>,
    #[cfg(test)]
    rebuilds: std::sync::atomic::AtomicUsize,
}

impl<S: Symbol + PartialEq, V> Automaton<S, V, Exact> {
    /// Creates an empty automaton comparing symbols with `==`.
    pub fn new() -> Self {
        Self::with_policy(Exact)
    }
}

impl<S: Symbol + PartialEq, V> Default for Automaton<S, V, Exact> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol, V, P: SymbolPolicy<S>> Automaton<S, V, P> {
    /// Creates an empty automaton using `policy` to compare, copy and release symbols.
    pub fn with_policy(policy: P) -> Self {
        Automaton {
            trie: Trie::new(),
            policy,
            next_rank: 0,
            keyword_count: 0,
            dirty: AtomicBool::new(false),
            rebuild_lock: Mutex::new(()),
            links: ArcSwap::from_pointee(FailLinks::empty()),
            #[cfg(test)]
            rebuilds: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// The symbol policy this automaton was created with.
    #[inline]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline]
    pub(crate) fn trie(&self) -> &Trie<S, V> {
        &self.trie
    }

    /// Registers `keyword` with the default value.
    ///
    /// See [`register_with`](Automaton::register_with).
    pub fn register(&mut self, keyword: impl IntoKeyword<S>) -> bool
    where
        V: Default,
    {
        self.register_with(keyword, V::default())
    }

    /// Registers `keyword` with an attached `value`.
    ///
    /// Returns `false`, leaving the automaton untouched, if the keyword is empty or
    /// already registered; the existing rank and value are kept and `value` is
    /// dropped. Otherwise the keyword gets the next insertion rank.
    pub fn register_with(&mut self, keyword: impl IntoKeyword<S>, value: V) -> bool {
        let keyword = keyword.collect_keyword();
        if keyword.is_empty() {
            trace!("ignoring empty keyword");
            return false;
        }
        match self
            .trie
            .insert(&self.policy, &keyword, self.next_rank, value)
        {
            Insertion::AlreadyPresent => {
                trace!(?keyword, "keyword already registered");
                false
            }
            Insertion::Inserted { state, new_states } => {
                trace!(?keyword, rank = self.next_rank, ?state, new_states, "registered keyword");
                self.next_rank += 1;
                self.keyword_count += 1;
                self.mark_dirty();
                true
            }
        }
    }

    /// Unregisters `keyword`, dropping its value and pruning states only it used.
    ///
    /// Returns `false` if the keyword was not registered. Ranks of other keywords
    /// are unchanged, and the removed rank is never handed out again.
    pub fn unregister(&mut self, keyword: impl IntoKeyword<S>) -> bool {
        let keyword = keyword.collect_keyword();
        match self.trie.remove(&self.policy, &keyword) {
            None => false,
            Some((terminal, pruned)) => {
                trace!(?keyword, rank = terminal.rank, pruned, "unregistered keyword");
                self.keyword_count -= 1;
                self.mark_dirty();
                true
            }
        }
    }

    /// Unregisters every keyword. Ranks keep counting from where they were.
    pub fn clear(&mut self) {
        self.trie.clear(&self.policy);
        self.keyword_count = 0;
        self.mark_dirty();
    }

    /// Returns true if `keyword` is registered.
    pub fn is_registered(&self, keyword: impl IntoKeyword<S>) -> bool {
        let keyword = keyword.collect_keyword();
        self.trie.find(&self.policy, &keyword).is_some()
    }

    /// Returns the value attached to `keyword`, if it is registered.
    pub fn get(&self, keyword: impl IntoKeyword<S>) -> Option<&V> {
        let keyword = keyword.collect_keyword();
        let state = self.trie.find(&self.policy, &keyword)?;
        self.trie.state(state).terminal.as_ref().map(|t| &t.value)
    }

    /// Returns the insertion rank of `keyword`, if it is registered.
    pub fn rank_of(&self, keyword: impl IntoKeyword<S>) -> Option<usize> {
        let keyword = keyword.collect_keyword();
        let state = self.trie.find(&self.policy, &keyword)?;
        self.trie.state(state).terminal.as_ref().map(|t| t.rank)
    }

    /// Number of registered keywords.
    #[inline]
    pub fn keyword_count(&self) -> usize {
        self.keyword_count
    }

    /// True if no keyword is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyword_count == 0
    }

    /// Number of trie states, root included.
    #[inline]
    pub fn state_count(&self) -> usize {
        self.trie.state_count()
    }

    /// Calls `visit` once per registered keyword, in unspecified order.
    pub fn for_each(&self, mut visit: impl FnMut(&[S], &V)) {
        self.trie
            .for_each_terminal(|symbols, terminal| visit(symbols, &terminal.value));
    }

    /// Like [`for_each`](Automaton::for_each), also passing each keyword's rank.
    pub fn for_each_ranked(&self, mut visit: impl FnMut(&[S], usize, &V)) {
        self.trie
            .for_each_terminal(|symbols, terminal| visit(symbols, terminal.rank, &terminal.value));
    }

    /// A new cursor positioned at the root.
    #[inline]
    pub fn cursor(&self) -> Cursor<'_, S, V, P> {
        Cursor::new(self)
    }

    /// Iterates over every keyword occurrence in `haystack`.
    pub fn scan<I>(&self, haystack: I) -> Scan<'_, S, V, P, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        Scan::new(self, haystack.into_iter())
    }

    /// True if edits happened since the failure function was last built.
    #[inline]
    pub fn needs_rebuild(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Brings the failure function up to date now instead of on the next scan.
    pub fn rebuild(&self) {
        self.fail_links();
    }

    fn mark_dirty(&mut self) {
        *self.dirty.get_mut() = true;
    }

    /// The current failure table, rebuilding it first if the trie changed.
    ///
    /// Concurrent callers that find the table stale queue on the lock; the first
    /// one in rebuilds, the others see the flag already cleared and reuse its work.
    pub(crate) fn fail_links(&self) -> Arc<FailLinks> {
        if self.dirty.load(Ordering::Acquire) {
            let _guard = self.rebuild_lock.lock();
            if self.dirty.load(Ordering::Acquire) {
                let started = Instant::now();
                let table = FailLinks::build(&self.trie, &self.policy);
                self.links.store(Arc::new(table));
                self.dirty.store(false, Ordering::Release);
                #[cfg(test)]
                self.rebuilds.fetch_add(1, Ordering::Relaxed);
                debug!(
                    states = self.trie.state_count(),
                    keywords = self.keyword_count,
                    elapsed = ?started.elapsed(),
                    "rebuilt failure function"
                );
            }
        }
        self.links.load_full()
    }

    pub(crate) fn match_at(&self, terminal: StateId) -> Match<'_, S, V> {
        let state = self.trie.state(terminal);
        let registration = state
            .terminal
            .as_ref()
            .expect("match reported for a non-terminal state");
        Match {
            keyword: self.trie.keyword_of(terminal),
            rank: registration.rank,
            value: &registration.value,
        }
    }
}

impl<S: Symbol, V, P: SymbolPolicy<S>> Drop for Automaton<S, V, P> {
    fn drop(&mut self) {
        self.trie.clear(&self.policy);
    }
}

impl<S: Symbol, V, P: SymbolPolicy<S>> fmt::Debug for Automaton<S, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("keyword_count", &self.keyword_count)
            .field("state_count", &self.state_count())
            .field("next_rank", &self.next_rank)
            .field("needs_rebuild", &self.needs_rebuild())
            .finish()
    }
}

impl<S, V, P, W> Extend<W> for Automaton<S, V, P>
where
    S: Symbol,
    V: Default,
    P: SymbolPolicy<S>,
    W: IntoKeyword<S>,
{
    fn extend<T: IntoIterator<Item = W>>(&mut self, keywords: T) {
        for keyword in keywords {
            self.register(keyword);
        }
    }
}

impl<S, V, P, W> FromIterator<W> for Automaton<S, V, P>
where
    S: Symbol,
    V: Default,
    P: SymbolPolicy<S> + Default,
    W: IntoKeyword<S>,
{
    fn from_iter<T: IntoIterator<Item = W>>(keywords: T) -> Self {
        let mut automaton = Self::with_policy(P::default());
        automaton.extend(keywords);
        automaton
    }
}

/// Builds an automaton from an iterator of keywords, in rank order.
///
/// Duplicates are registered once, keeping the rank of their first occurrence.
///
/// # Examples
///
/// ```
/// use libacm::acm::{Automaton, build_automaton};
///
/// let acm: Automaton<char> = build_automaton(["he", "she", "his", "hers", "he"]);
/// assert_eq!(acm.keyword_count(), 4);
/// assert_eq!(acm.rank_of("hers"), Some(3));
/// ```
pub fn build_automaton<S, W>(keywords: impl IntoIterator<Item = W>) -> Automaton<S>
where
    S: Symbol + PartialEq,
    W: IntoKeyword<S>,
{
    keywords.into_iter().collect()
}

/// Builds an automaton from a dictionary file, one keyword per line.
///
/// Trailing whitespace is trimmed. Blank lines and lines starting with '#' are skipped.
///
/// # Examples
///
/// ```no_run
/// use libacm::acm::build_automaton_from_file;
///
/// let acm = build_automaton_from_file("dictionary.txt").unwrap();
/// ```
pub fn build_automaton_from_file(path: impl AsRef<Path>) -> Result<Automaton<char>, AcmError> {
    let mut automaton = Automaton::new();
    let mut reader = BufReader::new(File::open(path.as_ref())?);

    // Reuse one line buffer instead of allocating a string per line.
    let mut buf = String::with_capacity(80);
    while reader.read_line(&mut buf)? > 0 {
        let keyword = buf.trim_end();
        if !keyword.is_empty() && !is_comment(keyword) {
            automaton.register(keyword);
        }
        buf.clear();
    }
    debug!(
        path = %path.as_ref().display(),
        keywords = automaton.keyword_count(),
        "loaded dictionary"
    );
    Ok(automaton)
}
