use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::{
    book::{Book, BookKey},
    config::LibraryConfig,
    error::Result,
    factory,
    library::Library,
    loan::{Loan, LoanId},
    member::{Member, MemberKey},
    notify::AvailabilityListener,
    status::BookStatus,
    summary::LibrarySummary,
};

/// A coordinator shared between threads. Every operation runs under the one lock.
pub type SharedLibraryManager = Arc<Mutex<LibraryManager>>;

/// Single entry point for callers working in catalog identifiers.
///
/// Resolves ids to handles, then hands off to the [`Library`] and the book
/// factory. Construct one explicitly and pass it to whatever needs it.
#[derive(Debug, Default)]
pub struct LibraryManager {
    /// The store being coordinated
    library: Library,
    /// Settings the manager was built with
    config: LibraryConfig,
}

impl LibraryManager {
    /// Create a manager over an empty library with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager over an empty library built from `config`
    ///
    /// # Errors
    ///
    /// Returns a `LibraryError::Config` if the configuration fails validation.
    pub fn with_config(config: LibraryConfig) -> Result<Self> {
        config.validate()?;
        let library = Library::with_loan_period(config.loan_period()?);
        Ok(Self { library, config })
    }

    /// Move the manager behind a mutex for use from several threads
    #[must_use]
    pub fn into_shared(self) -> SharedLibraryManager {
        Arc::new(Mutex::new(self))
    }

    /// Settings in use
    #[must_use]
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Read access to the underlying store
    #[must_use]
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Attach a listener that sees every delivered availability notice
    pub fn add_listener(&mut self, listener: Box<dyn AvailabilityListener>) {
        self.library.add_listener(listener);
    }

    /// Create a book from raw fields and store it
    ///
    /// # Errors
    ///
    /// Returns the factory's `MissingField` or `UnknownBookType` error; nothing
    /// is stored in that case.
    pub fn add_book(
        &mut self,
        kind: &str,
        id: &str,
        title: &str,
        author: &str,
        year: i32,
    ) -> Result<BookKey> {
        let book = factory::create_book(kind, id, title, author, year)?;
        Ok(self.library.add_book(book))
    }

    /// Remove the first book with `id`. Returns `false` if there is none.
    pub fn remove_book(&mut self, id: &str) -> bool {
        match self.library.find_book_by_id(id) {
            Some((key, _)) => self.library.remove_book(key),
            None => {
                debug!("MANAGER: no book {id} to remove");
                false
            }
        }
    }

    /// Enrol a member
    pub fn add_member(&mut self, id: &str, name: &str) -> MemberKey {
        self.library.add_member(Member::new(id, name))
    }

    /// Remove the first member with `id`. Returns `false` if there is none.
    pub fn remove_member(&mut self, id: &str) -> bool {
        match self.library.find_member_by_id(id) {
            Some((key, _)) => self.library.remove_member(key),
            None => {
                debug!("MANAGER: no member {id} to remove");
                false
            }
        }
    }

    /// Lend book `book_id` to member `member_id`.
    /// Returns whether a loan was created.
    pub fn borrow_book(&mut self, book_id: &str, member_id: &str) -> bool {
        let Some((book, member)) = self.resolve(book_id, member_id) else {
            return false;
        };
        self.library.borrow_book(book, member).is_some()
    }

    /// Take back book `book_id`.
    ///
    /// The book must be borrowed; the first active loan whose book has that
    /// id is returned. Returns whether a loan was found and returned.
    pub fn return_book(&mut self, book_id: &str) -> bool {
        self.active_loan_for(book_id).is_some_and(|loan| self.library.return_book(loan))
    }

    /// Push the due date of book `book_id`'s active loan back by one loan
    /// period. Returns whether a loan was renewed.
    pub fn renew_loan(&mut self, book_id: &str) -> bool {
        let Some(loan) = self.active_loan_for(book_id) else {
            return false;
        };
        let period = self.library.loan_period();
        let Some(due_date) =
            self.library.loan(loan).and_then(|record| record.due_date().checked_add_signed(period))
        else {
            warn!("MANAGER: cannot renew {book_id}, the new due date is out of range");
            return false;
        };
        self.library.renew_loan(loan, due_date)
    }

    /// Current counts over the catalog
    #[must_use]
    pub fn library_summary(&self) -> LibrarySummary {
        self.library.library_summary()
    }

    /// Store a copy of book `book_id` under a derived id and return that id.
    ///
    /// The copy keeps every field, status included, but nobody is registered
    /// for its availability. Returns `None` if the source does not exist.
    pub fn duplicate_book(&mut self, book_id: &str) -> Option<String> {
        let Some((_, original)) = self.library.find_book_by_id(book_id) else {
            debug!("MANAGER: no book {book_id} to duplicate");
            return None;
        };
        let new_id = format!("{book_id}{}", self.config.copy_suffix);
        let copy = original.duplicate_as(new_id.as_str());
        self.library.add_book(copy);
        info!("MANAGER: duplicated {book_id} as {new_id}");
        Some(new_id)
    }

    /// Notify member `member_id` whenever book `book_id` becomes available.
    /// Returns `false` if either is unknown or the interest already exists.
    pub fn register_interest(&mut self, member_id: &str, book_id: &str) -> bool {
        self.resolve(book_id, member_id)
            .is_some_and(|(book, member)| self.library.register_interest(member, book))
    }

    /// Stop notifying member `member_id` about book `book_id`
    pub fn withdraw_interest(&mut self, member_id: &str, book_id: &str) -> bool {
        self.resolve(book_id, member_id)
            .is_some_and(|(book, member)| self.library.withdraw_interest(member, book))
    }

    /// Set the status of book `book_id` directly. Returns `false` if the book
    /// does not exist.
    pub fn set_book_status(&mut self, book_id: &str, status: BookStatus) -> bool {
        let Some((key, _)) = self.library.find_book_by_id(book_id) else {
            return false;
        };
        self.library.set_book_status(key, status).is_some()
    }

    /// First book with `id`
    #[must_use]
    pub fn find_book(&self, id: &str) -> Option<&Book> {
        self.library.find_book_by_id(id).map(|(_, book)| book)
    }

    /// First member with `id`
    #[must_use]
    pub fn find_member(&self, id: &str) -> Option<&Member> {
        self.library.find_member_by_id(id).map(|(_, member)| member)
    }

    /// Stored books in insertion order
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.library.books().map(|(_, book)| book)
    }

    /// Stored members in insertion order
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.library.members().map(|(_, member)| member)
    }

    /// Loans not yet returned
    #[must_use]
    pub fn active_loans(&self) -> Vec<(LoanId, &Loan)> {
        self.library.active_loans()
    }

    /// Loans past their due date right now
    #[must_use]
    pub fn overdue_loans(&self) -> Vec<(LoanId, &Loan)> {
        self.library.overdue_loans()
    }

    /// Loans past their due date at `now`
    #[must_use]
    pub fn overdue_loans_at(&self, now: DateTime<Utc>) -> Vec<(LoanId, &Loan)> {
        self.library.overdue_loans_at(now)
    }

    /// The active loan of borrowed book `book_id`, logging why there is none
    fn active_loan_for(&self, book_id: &str) -> Option<LoanId> {
        let Some((_, book)) = self.library.find_book_by_id(book_id) else {
            warn!("MANAGER: unknown book {book_id}");
            return None;
        };
        if book.status() != BookStatus::Borrowed {
            warn!("MANAGER: {book_id} is not out on loan, status is {}", book.status());
            return None;
        }

        let loan = self
            .library
            .active_loans()
            .into_iter()
            .find(|(_, loan)| self.library.book(loan.book()).is_some_and(|b| b.id() == book_id))
            .map(|(id, _)| id);
        if loan.is_none() {
            warn!("MANAGER: {book_id} is borrowed but no active loan refers to it");
        }
        loan
    }

    /// Look up a book and a member by id, logging whichever is missing
    fn resolve(&self, book_id: &str, member_id: &str) -> Option<(BookKey, MemberKey)> {
        let book = self.library.find_book_by_id(book_id).map(|(key, _)| key);
        let member = self.library.find_member_by_id(member_id).map(|(key, _)| key);
        if book.is_none() {
            warn!("MANAGER: unknown book {book_id}");
        }
        if member.is_none() {
            warn!("MANAGER: unknown member {member_id}");
        }
        book.zip(member)
    }
}

#[cfg(test)]
mod tests;
