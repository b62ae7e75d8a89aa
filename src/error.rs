use thiserror::Error;

/// Main error type for tmeval
#[derive(Error, Debug)]
pub enum TmevalError {
    /// A vocabulary contains the same word twice
    #[error("Found duplicate word: {0}")]
    DuplicateWord(String),

    /// The first line of an embedding file has no integer dimension token
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A data line (embedding, dictionary or mapping file) could not be parsed
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Both or neither of {direct mapping, persisted mapping path} were given
    #[error("Translation matrix or training words specified ambiguously: {0}")]
    AmbiguousMapping(String),

    /// Mapping and space dimensions disagree
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted mapping (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using TmevalError
pub type Result<T> = std::result::Result<T, TmevalError>;
