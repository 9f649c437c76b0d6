use thiserror::Error;

/// Errors reported by the automaton.
///
/// Unknown keywords and duplicate registrations are not errors; those calls
/// answer with a `bool` or an `Option`.
#[derive(Debug, Error)]
pub enum AcmError {
    /// A match was requested past the number of keywords ending at the cursor.
    #[error("match index {index} out of range: {count} keyword(s) end at this position")]
    MatchIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of matches available at the position.
        count: usize,
    },

    /// A dictionary file could not be read.
    #[error("failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = AcmError::MatchIndexOutOfRange { index: 3, count: 2 };
        assert_eq!(
            err.to_string(),
            "match index 3 out of range: 2 keyword(s) end at this position"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: AcmError = io.into();
        assert!(matches!(err, AcmError::Io(_)));
        assert!(err.to_string().starts_with("failed to read dictionary"));
    }
}
