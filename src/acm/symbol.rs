use std::fmt::Debug;

/// Trait for types that can serve as symbols of a keyword alphabet.
///
/// This trait is automatically implemented for any type satisfying the
/// required bounds (`char`, `u8`, `u32`, `String`, etc.).
///
/// - `Clone`: the default policies copy symbols into the trie by cloning
/// - `Debug`: debug printing of states and matches
pub trait Symbol: Clone + Debug {}

impl<T: Clone + Debug> Symbol for T {}

/// The three capabilities the automaton needs from its alphabet.
///
/// `eq` is always called with a symbol already stored in the trie on the left and
/// the symbol being looked up on the right, so a policy may be asymmetric (for
/// instance, stored keywords in lowercase compared against text of any case).
pub trait SymbolPolicy<S> {
    /// True if the stored symbol accepts the incoming one.
    fn eq(&self, stored: &S, incoming: &S) -> bool;

    /// Produces the copy that the trie keeps for a transition.
    fn copy(&self, symbol: &S) -> S;

    /// Releases a symbol previously produced by [`copy`](SymbolPolicy::copy).
    fn destroy(&self, symbol: S) {
        drop(symbol);
    }
}

/// Value equality, clone on copy, plain drop on destroy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Exact;

impl<S: Symbol + PartialEq> SymbolPolicy<S> for Exact {
    #[inline]
    fn eq(&self, stored: &S, incoming: &S) -> bool {
        stored == incoming
    }

    #[inline]
    fn copy(&self, symbol: &S) -> S {
        symbol.clone()
    }
}

/// ASCII case-insensitive equality for `char` and `u8` alphabets.
///
/// Keywords are stored folded to lowercase, so matches reconstructed from the
/// trie come back in lowercase regardless of how they were registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreAsciiCase;

impl SymbolPolicy<char> for IgnoreAsciiCase {
    #[inline]
    fn eq(&self, stored: &char, incoming: &char) -> bool {
        *stored == incoming.to_ascii_lowercase()
    }

    #[inline]
    fn copy(&self, symbol: &char) -> char {
        symbol.to_ascii_lowercase()
    }
}

impl SymbolPolicy<u8> for IgnoreAsciiCase {
    #[inline]
    fn eq(&self, stored: &u8, incoming: &u8) -> bool {
        *stored == incoming.to_ascii_lowercase()
    }

    #[inline]
    fn copy(&self, symbol: &u8) -> u8 {
        symbol.to_ascii_lowercase()
    }
}

/// A policy built from an equality closure; symbols are copied by cloning.
///
/// ```
/// use libacm::acm::{Automaton, EqFn};
///
/// // Treat every digit as the same symbol.
/// let digits = EqFn(|stored: &char, incoming: &char| {
///     stored == incoming || (stored.is_ascii_digit() && incoming.is_ascii_digit())
/// });
/// let mut acm: Automaton<char, (), _> = Automaton::with_policy(digits);
/// acm.register("v0");
/// assert_eq!(acm.scan("v7 v9".chars()).count(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct EqFn<F>(pub F);

impl<S, F> SymbolPolicy<S> for EqFn<F>
where
    S: Symbol,
    F: Fn(&S, &S) -> bool,
{
    #[inline]
    fn eq(&self, stored: &S, incoming: &S) -> bool {
        (self.0)(stored, incoming)
    }

    #[inline]
    fn copy(&self, symbol: &S) -> S {
        symbol.clone()
    }
}

impl<F> Debug for EqFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EqFn(..)")
    }
}
