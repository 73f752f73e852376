use thiserror::Error;

/// Result type for fact loading operations
pub type Result<T> = std::result::Result<T, FactsError>;

/// Errors raised while loading or serializing facts
#[derive(Error, Debug)]
pub enum FactsError {
    /// Malformed N3 input
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Predicate outside the closed vocabulary
    #[error("Unknown predicate at line {line}: {name}")]
    UnknownPredicate { line: usize, name: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FactsError {
    /// Create a parse error
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }
}

/// Errors reported by an inference oracle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// The reasoner could not produce a result
    #[error("Oracle failed: {0}")]
    Failed(String),

    /// The reasoner returned a statement outside the derived vocabulary
    #[error("Oracle returned non-derived predicate: {0}")]
    ForeignPredicate(String),

    /// The reasoner did not answer in time
    #[error("Oracle timed out after {0}s")]
    Timeout(u64),
}
