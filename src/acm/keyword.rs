use smallvec::SmallVec;

use super::symbol::Symbol;

/// Buffer holding the symbols of one keyword while it is being registered or looked up.
pub type KeywordBuf<S> = SmallVec<[S; 32]>;

/// Trait for types that can be used as a keyword.
///
/// Implemented for common string and sequence types so that
/// [`Automaton::register`](super::Automaton::register) and friends accept them
/// directly without manual conversion. The automaton keeps its own copies of
/// the symbols, so the caller's buffer can be dropped right after the call.
pub trait IntoKeyword<S: Symbol> {
    /// Collects this keyword into a symbol buffer.
    fn collect_keyword(self) -> KeywordBuf<S>;
}

macro_rules! text_keyword {
    ($($text:ty),+ $(,)?) => {
        $(
            impl IntoKeyword<char> for $text {
                #[inline]
                fn collect_keyword(self) -> KeywordBuf<char> {
                    self.chars().collect()
                }
            }
        )+
    };
}

text_keyword!(&str, &&str, String, &String);

impl<S: Symbol> IntoKeyword<S> for &[S] {
    fn collect_keyword(self) -> KeywordBuf<S> {
        self.iter().cloned().collect()
    }
}

impl<S: Symbol> IntoKeyword<S> for Vec<S> {
    fn collect_keyword(self) -> KeywordBuf<S> {
        self.into_iter().collect()
    }
}

impl<S: Symbol> IntoKeyword<S> for &Vec<S> {
    fn collect_keyword(self) -> KeywordBuf<S> {
        self.iter().cloned().collect()
    }
}

impl<S: Symbol, const N: usize> IntoKeyword<S> for [S; N] {
    fn collect_keyword(self) -> KeywordBuf<S> {
        self.into_iter().collect()
    }
}

impl<S: Symbol, const N: usize> IntoKeyword<S> for &[S; N] {
    fn collect_keyword(self) -> KeywordBuf<S> {
        self.iter().cloned().collect()
    }
}

/// Returns true if this dictionary line is a comment.
pub(crate) fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}
