use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::{book::BookKey, member::MemberKey};

/// Tells one member that a book they asked about is back on the shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityNotice {
    /// Identifier of the member notified
    pub member_id: String,
    /// Display name of the member notified
    pub member_name: String,
    /// Identifier of the book that became available
    pub book_id: String,
    /// Title of the book that became available
    pub title: String,
    /// When the book became available
    pub at: DateTime<Utc>,
}

/// Trait for availability observation beyond the member's own inbox
pub trait AvailabilityListener: Send {
    /// Called once per notice, just before it lands in the member's inbox
    fn on_available(&self, notice: &AvailabilityNotice);
}

/// Logs every notice that is delivered
#[derive(Debug)]
pub struct LoggingListener;

impl AvailabilityListener for LoggingListener {
    fn on_available(&self, notice: &AvailabilityNotice) {
        info!(
            "NOTIFICATION: for member {}: the book '{}' is now available",
            notice.member_name, notice.title
        );
    }
}

/// Who is waiting on which book.
///
/// Keeps both directions of the interest relation: per book, the observers in
/// registration order, and per member, the set of books of interest.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityRegistry {
    /// Book handle to observing members, in registration order
    observers: HashMap<BookKey, Vec<MemberKey>>,
    /// Member handle to the books it asked about
    interests: HashMap<MemberKey, HashSet<BookKey>>,
}

impl AvailabilityRegistry {
    /// Register `member` as interested in `book`.
    /// Returns `false` if it already was.
    pub fn register(&mut self, member: MemberKey, book: BookKey) -> bool {
        if !self.interests.entry(member).or_default().insert(book) {
            return false;
        }
        self.observers.entry(book).or_default().push(member);
        true
    }

    /// Drop the interest of `member` in `book`.
    /// Returns `false` if there was none.
    pub fn withdraw(&mut self, member: MemberKey, book: BookKey) -> bool {
        if !self.interests.get_mut(&member).is_some_and(|books| books.remove(&book)) {
            return false;
        }
        if let Some(members) = self.observers.get_mut(&book) {
            members.retain(|observer| *observer != member);
        }
        true
    }

    /// Observers of `book` in registration order
    #[must_use]
    pub fn observers_of(&self, book: BookKey) -> &[MemberKey] {
        self.observers.get(&book).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `member` asked about `book`
    #[must_use]
    pub fn is_interested(&self, member: MemberKey, book: BookKey) -> bool {
        self.interests.get(&member).is_some_and(|books| books.contains(&book))
    }

    /// Books `member` asked about, in handle order
    #[must_use]
    pub fn interests_of(&self, member: MemberKey) -> Vec<BookKey> {
        let mut books: Vec<BookKey> = self
            .interests
            .get(&member)
            .map(|books| books.iter().copied().collect())
            .unwrap_or_default();
        books.sort_unstable();
        books
    }

    /// Forget every relation involving `book`
    pub fn forget_book(&mut self, book: BookKey) {
        if let Some(members) = self.observers.remove(&book) {
            for member in members {
                if let Some(books) = self.interests.get_mut(&member) {
                    books.remove(&book);
                }
            }
        }
    }

    /// Forget every relation involving `member`
    pub fn forget_member(&mut self, member: MemberKey) {
        if let Some(books) = self.interests.remove(&member) {
            for book in books {
                if let Some(members) = self.observers.get_mut(&book) {
                    members.retain(|observer| *observer != member);
                }
            }
        }
    }
}
