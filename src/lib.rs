//! # libacm
//!
//! An [Aho-Corasick](https://en.wikipedia.org/wiki/Aho%E2%80%93Corasick_algorithm) keyword
//! matching machine for Rust, following Aho & Corasick,
//! "Efficient string matching: an aid to bibliographic search" (CACM, 1975).
//!
//! The automaton holds a set of keywords over any symbol type and scans an input
//! sequence once, reporting at every position each keyword that ends there. The time
//! spent per input symbol does not depend on how many keywords are registered.
//!
//! ## Features
//!
//! - **Generic over the alphabet**: keywords are sequences of `char`, `u8`, `String` or any
//!   type implementing [`Symbol`](acm::Symbol)
//! - **Pluggable comparison**: symbols are compared, copied and released through a
//!   [`SymbolPolicy`](acm::SymbolPolicy), so case folding or custom equivalences need no
//!   preprocessing of the text
//! - **Incremental**: keywords can be registered and unregistered at any time; the failure
//!   function is rebuilt lazily by the next scan
//! - **Thread-safe scanning**: any number of [`Cursor`](acm::Cursor)s can scan one
//!   [`Automaton`](acm::Automaton) concurrently
//!
//! ## Quick Start
//!
//! ```
//! use libacm::acm::{Automaton, build_automaton};
//!
//! let acm: Automaton<char> = build_automaton(["he", "she", "his", "hers"]);
//!
//! let hits: Vec<(usize, String)> = acm
//!     .scan("ushers".chars())
//!     .map(|hit| (hit.start(), hit.matched.keyword.iter().collect()))
//!     .collect();
//! assert_eq!(
//!     hits,
//!     [(1, "she".to_string()), (2, "he".to_string()), (2, "hers".to_string())]
//! );
//! ```
//!
//! ## Values and ranks
//!
//! Every keyword carries an insertion rank and an optional value:
//!
//! ```
//! use libacm::acm::Automaton;
//!
//! let mut acm: Automaton<char, u32> = Automaton::new();
//! acm.register_with("GET", 1);
//! acm.register_with("POST", 2);
//!
//! let hit = acm.scan("xPOSTx".chars()).next().unwrap();
//! assert_eq!((hit.position, hit.matched.rank, *hit.matched.value), (4, 1, 2));
//! ```
//!
//! ## Custom symbol policies
//!
//! ```
//! use libacm::acm::{Automaton, IgnoreAsciiCase};
//!
//! let mut acm: Automaton<u8, (), IgnoreAsciiCase> = Automaton::with_policy(IgnoreAsciiCase);
//! acm.register(b"select");
//! assert_eq!(acm.scan(b"SELECT * FROM t".iter()).count(), 1);
//! ```

#![warn(missing_docs)]

/// Core Aho-Corasick machine: trie, failure function, cursors and symbol policies.
pub mod acm;

#[cfg(test)]
mod test {
    use std::iter;

    use hashbrown::HashSet;
    use itertools::Itertools;

    use super::acm::{Automaton, build_automaton};

    /// Every string over `alphabet` with length in `1..=max_len`.
    fn strings(alphabet: &str, max_len: usize) -> Vec<Vec<char>> {
        (1..=max_len)
            .flat_map(|len| iter::repeat_n(alphabet.chars(), len).multi_cartesian_product())
            .collect()
    }

    /// Checks every substring of `text` against the keyword set.
    fn brute_force(keywords: &HashSet<Vec<char>>, text: &[char]) -> Vec<(usize, Vec<char>)> {
        let mut hits = Vec::new();
        for end in 0..text.len() {
            for start in 0..=end {
                let candidate = &text[start..=end];
                if keywords.contains(candidate) {
                    hits.push((end, candidate.to_vec()));
                }
            }
        }
        hits
    }

    fn scanned(acm: &Automaton<char>, text: &[char]) -> Vec<(usize, Vec<char>)> {
        acm.scan(text)
            .map(|hit| (hit.position, hit.matched.keyword))
            .collect()
    }

    #[test]
    fn matches_brute_force_on_small_alphabet() {
        let keywords = strings("ab", 3);
        let texts = strings("abc", 5);
        for set in keywords.iter().combinations(3) {
            let acm: Automaton<char> = build_automaton(set.iter().copied());
            let oracle: HashSet<Vec<char>> = set.iter().map(|kw| kw.to_vec()).collect();
            for text in &texts {
                assert_eq!(
                    scanned(&acm, text),
                    brute_force(&oracle, text),
                    "keywords {set:?}, text {text:?}"
                );
            }
        }
    }

    #[test]
    fn matches_brute_force_after_removal() {
        let keywords = strings("ab", 3);
        let texts = strings("ab", 4);
        for set in keywords.iter().combinations(3) {
            let mut acm: Automaton<char> = build_automaton(set.iter().copied());
            acm.rebuild();
            assert!(acm.unregister(set[0]));
            let oracle: HashSet<Vec<char>> = set[1..].iter().map(|kw| kw.to_vec()).collect();
            for text in &texts {
                assert_eq!(
                    scanned(&acm, text),
                    brute_force(&oracle, text),
                    "keywords {:?} without {:?}, text {text:?}",
                    &set[1..],
                    set[0]
                );
            }
        }
    }

    #[test]
    fn concurrent_scans_agree_with_brute_force() {
        let words = strings("abc", 4);
        let mut acm: Automaton<char> = build_automaton(&words);
        assert!(acm.needs_rebuild());

        let text: Vec<char> = "abcabcaabbccbaca".chars().collect();
        let expected = {
            let oracle: HashSet<Vec<char>> = words.iter().cloned().collect();
            brute_force(&oracle, &text)
        };

        let (shared, haystack) = (&acm, &text);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(move || scanned(shared, haystack)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
        assert!(!acm.needs_rebuild());

        // Editing after the scans marks the table stale again.
        acm.unregister("abc");
        assert!(acm.needs_rebuild());
        let hits = scanned(&acm, &text);
        assert_eq!(hits.len(), expected.len() - 2);
    }
}
