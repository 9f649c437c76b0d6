/// The automaton handle: registration, lookup and lazy failure rebuild.
pub mod automaton;
/// Scanning cursors, match records and the `scan` iterator.
pub mod cursor;
/// Error type for fallible operations.
pub mod error;
/// Fail links and output counts, derived from the trie.
pub(crate) mod failure;
/// Conversion of strings and slices into keyword buffers.
pub mod keyword;
/// Index arena holding the trie states.
pub(crate) mod state_arena;
/// Symbol bound and comparison policies.
pub mod symbol;
/// Outgoing edges of a trie state.
pub(crate) mod transitions;
/// The keyword trie underlying the automaton.
pub(crate) mod trie;

pub use automaton::{Automaton, build_automaton, build_automaton_from_file};
pub use cursor::{Cursor, Hit, Match, Matches, Scan};
pub use error::AcmError;
pub use keyword::{IntoKeyword, KeywordBuf};
pub use symbol::{EqFn, Exact, IgnoreAsciiCase, Symbol, SymbolPolicy};
