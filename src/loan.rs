use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{book::BookKey, member::MemberKey};

/// Days a book may be kept before the loan is overdue
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

/// Position of a loan in the repository's loan history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LoanId(usize);

impl LoanId {
    /// Wrap a history position
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the loan history
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loan#{}", self.0)
    }
}

/// A loan of one book to one member.
///
/// The loan refers to both by handle and owns neither. Once returned it stays
/// in the loan history for good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    /// The book lent
    book: BookKey,
    /// The borrowing member
    member: MemberKey,
    /// When the book went out
    borrow_date: DateTime<Utc>,
    /// When the book is expected back
    due_date: DateTime<Utc>,
    /// When the book came back, if it has
    return_date: Option<DateTime<Utc>>,
}

impl Loan {
    /// Create an active loan
    #[must_use]
    pub fn new(
        book: BookKey,
        member: MemberKey,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self { book, member, borrow_date, due_date, return_date: None }
    }

    /// The book lent
    #[must_use]
    pub fn book(&self) -> BookKey {
        self.book
    }

    /// The borrowing member
    #[must_use]
    pub fn member(&self) -> MemberKey {
        self.member
    }

    /// When the book went out
    #[must_use]
    pub fn borrow_date(&self) -> DateTime<Utc> {
        self.borrow_date
    }

    /// When the book is expected back
    #[must_use]
    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// Move the due date
    pub(crate) fn set_due_date(&mut self, due_date: DateTime<Utc>) {
        self.due_date = due_date;
    }

    /// When the book came back
    #[must_use]
    pub fn return_date(&self) -> Option<DateTime<Utc>> {
        self.return_date
    }

    /// Whether the book is still out
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whether the book is still out past its due date at `now`
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && now > self.due_date
    }

    /// Stamp the return date. A loan is only returned once; later calls
    /// leave the first stamp alone and return `false`.
    pub(crate) fn mark_returned(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_active() {
            self.return_date = Some(at);
            true
        } else {
            false
        }
    }
}
