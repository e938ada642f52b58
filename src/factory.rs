//! Construction of typed book records from raw field input.

use log::debug;

use crate::{
    book::{Book, BookKind},
    error::{Field, LibraryError, Result},
};

/// Create a book of the kind named by `kind`, with its kind attribute
/// defaulted (genre and subject `"Unknown"`, reference books not borrowable).
///
/// The kind tag is matched ignoring case and surrounding whitespace, so
/// `" Fiction "` names fiction. The year is taken as given. Range checks
/// belong to whoever parsed it.
///
/// # Errors
///
/// Returns `LibraryError::MissingField` if the kind, id, title or author is
/// blank (checked in that order), and `LibraryError::UnknownBookType` if the
/// kind tag names no known kind.
pub fn create_book(kind: &str, id: &str, title: &str, author: &str, year: i32) -> Result<Book> {
    require(Field::BookType, kind)?;
    require(Field::BookId, id)?;
    require(Field::Title, title)?;
    require(Field::Author, author)?;

    let kind = BookKind::from_tag(kind)?;
    debug!("FACTORY: creating {} book {id}", kind.tag());
    Ok(Book::new(id, title, author, year, kind))
}

/// Reject blank values for `field`
fn require(field: Field, value: &str) -> Result<()> {
    if value.trim().is_empty() { Err(LibraryError::MissingField(field)) } else { Ok(()) }
}
