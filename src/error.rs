use std::fmt;

use thiserror::Error;

/// Required text fields checked when a book is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The book-kind tag (`fiction`, `non-fiction`, `reference`)
    BookType,
    /// The catalog identifier
    BookId,
    /// The title
    Title,
    /// The author
    Author,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BookType => "type",
            Self::BookId => "ID",
            Self::Title => "title",
            Self::Author => "author",
        };
        f.write_str(name)
    }
}

/// Errors raised by catalog operations.
///
/// Only malformed input and ambient failures are errors. An operation that
/// is simply not applicable to the current state (borrowing a book that is
/// out, returning a book nobody holds) reports `false` or `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// A required field was missing or whitespace only
    #[error("Book {0} cannot be null or empty")]
    MissingField(Field),
    /// The book-kind tag matched none of the known kinds
    #[error("Unknown book type: {0}")]
    UnknownBookType(String),
    /// A publication year that is not a whole number in `0..=9999`
    #[error("Invalid year {0:?}: expected a whole number between 0 and 9999")]
    InvalidYear(String),
    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),
    /// Input could not be read
    #[error("I/O error: {0}")]
    Io(String),
    /// A result could not be rendered for output
    #[error("Output error: {0}")]
    Output(String),
    /// A command script line could not be understood
    #[error("Script error on line {line}: {message}")]
    Script {
        /// One-based line number in the script
        line: usize,
        /// What was wrong with the line
        message: String,
    },
}

impl LibraryError {
    /// Whether this error reports malformed caller input, the class a
    /// presentation layer is expected to catch and render to its user
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::UnknownBookType(_) | Self::InvalidYear(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LibraryError>;
