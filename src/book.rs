use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{LibraryError, Result},
    status::BookStatus,
};

/// Default for the genre and subject attributes of freshly created books
pub const UNKNOWN_ATTRIBUTE: &str = "Unknown";

/// Repository handle for a stored book.
///
/// Handles are unique per insertion, so two books sharing a catalog id
/// still have distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BookKey(u64);

impl BookKey {
    /// Wrap a raw handle value
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "book#{}", self.0)
    }
}

/// The three kinds of book, each with its own optional attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BookKind {
    /// A novel or story collection
    Fiction {
        /// Literary genre
        genre: String,
    },
    /// A factual work
    NonFiction {
        /// Subject area
        subject: String,
    },
    /// Dictionaries, encyclopedias and the like
    Reference {
        /// Whether the volume may leave the library
        can_be_borrowed: bool,
    },
}

impl BookKind {
    /// The kind named by `tag` with its attribute defaulted.
    ///
    /// Tags are matched case-insensitively after trimming.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::UnknownBookType` if the tag names no kind.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "fiction" => Ok(Self::Fiction { genre: UNKNOWN_ATTRIBUTE.to_string() }),
            "non-fiction" => Ok(Self::NonFiction { subject: UNKNOWN_ATTRIBUTE.to_string() }),
            "reference" => Ok(Self::Reference { can_be_borrowed: false }),
            _ => Err(LibraryError::UnknownBookType(tag.to_string())),
        }
    }

    /// Canonical tag for this kind
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Fiction { .. } => "fiction",
            Self::NonFiction { .. } => "non-fiction",
            Self::Reference { .. } => "reference",
        }
    }
}

impl fmt::Display for BookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fiction { genre } => write!(f, "fiction (genre: {genre})"),
            Self::NonFiction { subject } => write!(f, "non-fiction (subject: {subject})"),
            Self::Reference { can_be_borrowed: true } => f.write_str("reference (borrowable)"),
            Self::Reference { can_be_borrowed: false } => f.write_str("reference (in-library use)"),
        }
    }
}

/// A catalogued book
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Catalog identifier, fixed at creation
    id: String,
    /// Title
    title: String,
    /// Author
    author: String,
    /// Year of publication
    publication_year: i32,
    /// Current lending status
    status: BookStatus,
    /// Kind and kind-specific attribute
    kind: BookKind,
}

impl Book {
    /// Create an available book
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        publication_year: i32,
        kind: BookKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            publication_year,
            status: BookStatus::Available,
            kind,
        }
    }

    /// Catalog identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Year of publication
    #[must_use]
    pub fn publication_year(&self) -> i32 {
        self.publication_year
    }

    /// Current lending status
    #[must_use]
    pub fn status(&self) -> BookStatus {
        self.status
    }

    /// Kind and kind-specific attribute
    #[must_use]
    pub fn kind(&self) -> &BookKind {
        &self.kind
    }

    /// Genre, for fiction
    #[must_use]
    pub fn genre(&self) -> Option<&str> {
        match &self.kind {
            BookKind::Fiction { genre } => Some(genre.as_str()),
            _ => None,
        }
    }

    /// Subject, for non-fiction
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match &self.kind {
            BookKind::NonFiction { subject } => Some(subject.as_str()),
            _ => None,
        }
    }

    /// Borrowable flag, for reference books
    #[must_use]
    pub fn can_be_borrowed(&self) -> Option<bool> {
        match self.kind {
            BookKind::Reference { can_be_borrowed } => Some(can_be_borrowed),
            _ => None,
        }
    }

    /// Set the genre. Returns `false` and changes nothing unless this is fiction.
    pub fn set_genre(&mut self, value: impl Into<String>) -> bool {
        match &mut self.kind {
            BookKind::Fiction { genre } => {
                *genre = value.into();
                true
            }
            _ => false,
        }
    }

    /// Set the subject. Returns `false` and changes nothing unless this is non-fiction.
    pub fn set_subject(&mut self, value: impl Into<String>) -> bool {
        match &mut self.kind {
            BookKind::NonFiction { subject } => {
                *subject = value.into();
                true
            }
            _ => false,
        }
    }

    /// Set the borrowable flag. Returns `false` and changes nothing unless
    /// this is a reference book.
    pub fn set_borrowable(&mut self, value: bool) -> bool {
        match &mut self.kind {
            BookKind::Reference { can_be_borrowed } => {
                *can_be_borrowed = value;
                true
            }
            _ => false,
        }
    }

    /// Replace the status, returning whether the book just became available
    /// from some other status
    pub(crate) fn set_status(&mut self, status: BookStatus) -> bool {
        let previous = std::mem::replace(&mut self.status, status);
        !previous.is_available() && status.is_available()
    }

    /// A field-for-field copy under a new identifier
    #[must_use]
    pub fn duplicate_as(&self, new_id: impl Into<String>) -> Self {
        Self {
            id: new_id.into(),
            title: self.title.clone(),
            author: self.author.clone(),
            publication_year: self.publication_year,
            status: self.status,
            kind: self.kind.clone(),
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" by {} ({}) [{}] {}",
            self.id, self.title, self.author, self.publication_year, self.status, self.kind
        )
    }
}
