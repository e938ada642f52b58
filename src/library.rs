use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};

use crate::{
    book::{Book, BookKey},
    loan::{DEFAULT_LOAN_PERIOD_DAYS, Loan, LoanId},
    member::{Member, MemberKey},
    notify::{AvailabilityListener, AvailabilityNotice, AvailabilityRegistry},
    status::BookStatus,
    summary::LibrarySummary,
};

/// The authoritative in-memory store of books, members and loans.
///
/// Collections keep insertion order and are searched linearly. Identifiers
/// are not required to be unique: id lookups return the first match, while
/// removal works on handles.
pub struct Library {
    /// Stored books with their handles
    books: Vec<(BookKey, Book)>,
    /// Stored members with their handles
    members: Vec<(MemberKey, Member)>,
    /// Every loan ever made, indexed by `LoanId`
    loans: Vec<Loan>,
    /// Interest relations between members and books
    registry: AvailabilityRegistry,
    /// Extra receivers of availability notices
    listeners: Vec<Box<dyn AvailabilityListener>>,
    /// Time between borrowing and the due date
    loan_period: TimeDelta,
    /// Next raw handle value to hand out
    next_key: u64,
}

// Manual implementation of Debug for Library
impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("books", &self.books)
            .field("members", &self.members)
            .field("loans", &self.loans)
            .field("registry", &self.registry)
            .field("listeners_count", &self.listeners.len())
            .field("loan_period", &self.loan_period)
            .field("next_key", &self.next_key)
            .finish()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// Create an empty library with the default 14-day loan period
    #[must_use]
    pub fn new() -> Self {
        Self::with_loan_period(TimeDelta::days(DEFAULT_LOAN_PERIOD_DAYS))
    }

    /// Create an empty library lending for `loan_period`
    #[must_use]
    pub fn with_loan_period(loan_period: TimeDelta) -> Self {
        Self {
            books: Vec::new(),
            members: Vec::new(),
            loans: Vec::new(),
            registry: AvailabilityRegistry::default(),
            listeners: Vec::new(),
            loan_period,
            next_key: 0,
        }
    }

    /// Time between borrowing and the due date
    #[must_use]
    pub fn loan_period(&self) -> TimeDelta {
        self.loan_period
    }

    /// Attach a listener that sees every delivered availability notice
    pub fn add_listener(&mut self, listener: Box<dyn AvailabilityListener>) {
        self.listeners.push(listener);
    }

    /// Hand out the next raw handle value
    #[allow(clippy::arithmetic_side_effects)]
    fn next_raw_key(&mut self) -> u64 {
        let raw = self.next_key;
        self.next_key += 1;
        raw
    }

    /// Store a book. Duplicate ids are accepted.
    pub fn add_book(&mut self, book: Book) -> BookKey {
        let key = BookKey::new(self.next_raw_key());
        info!("LIBRARY: added book {} as {key}", book.id());
        self.books.push((key, book));
        key
    }

    /// Remove a book by handle, returning whether it was stored.
    ///
    /// Loans that refer to the book are left as they are.
    pub fn remove_book(&mut self, key: BookKey) -> bool {
        let Some(pos) = self.books.iter().position(|(k, _)| *k == key) else {
            debug!("LIBRARY: no book stored as {key}");
            return false;
        };
        let (_, book) = self.books.remove(pos);
        self.registry.forget_book(key);
        info!("LIBRARY: removed book {}", book.id());
        true
    }

    /// Store a member. Duplicate ids are accepted.
    pub fn add_member(&mut self, member: Member) -> MemberKey {
        let key = MemberKey::new(self.next_raw_key());
        info!("LIBRARY: added member {} as {key}", member.id());
        self.members.push((key, member));
        key
    }

    /// Remove a member by handle, returning whether it was stored.
    ///
    /// Loans held by the member are left as they are.
    pub fn remove_member(&mut self, key: MemberKey) -> bool {
        let Some(pos) = self.members.iter().position(|(k, _)| *k == key) else {
            debug!("LIBRARY: no member stored as {key}");
            return false;
        };
        let (_, member) = self.members.remove(pos);
        self.registry.forget_member(key);
        info!("LIBRARY: removed member {}", member.id());
        true
    }

    /// First stored book with identifier `id`
    #[must_use]
    pub fn find_book_by_id(&self, id: &str) -> Option<(BookKey, &Book)> {
        self.books.iter().find(|(_, book)| book.id() == id).map(|(key, book)| (*key, book))
    }

    /// First stored member with identifier `id`
    #[must_use]
    pub fn find_member_by_id(&self, id: &str) -> Option<(MemberKey, &Member)> {
        self.members
            .iter()
            .find(|(_, member)| member.id() == id)
            .map(|(key, member)| (*key, member))
    }

    /// The book stored as `key`
    #[must_use]
    pub fn book(&self, key: BookKey) -> Option<&Book> {
        self.books.iter().find(|(k, _)| *k == key).map(|(_, book)| book)
    }

    /// Mutable access to the book stored as `key`.
    ///
    /// Status is not reachable this way; use [`Library::set_book_status`].
    pub fn book_mut(&mut self, key: BookKey) -> Option<&mut Book> {
        self.books.iter_mut().find(|(k, _)| *k == key).map(|(_, book)| book)
    }

    /// The member stored as `key`
    #[must_use]
    pub fn member(&self, key: MemberKey) -> Option<&Member> {
        self.members.iter().find(|(k, _)| *k == key).map(|(_, member)| member)
    }

    /// Mutable access to the member stored as `key`
    pub fn member_mut(&mut self, key: MemberKey) -> Option<&mut Member> {
        self.members.iter_mut().find(|(k, _)| *k == key).map(|(_, member)| member)
    }

    /// The loan recorded as `id`
    #[must_use]
    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.get(id.index())
    }

    /// Stored books in insertion order
    pub fn books(&self) -> impl Iterator<Item = (BookKey, &Book)> {
        self.books.iter().map(|(key, book)| (*key, book))
    }

    /// Stored members in insertion order
    pub fn members(&self) -> impl Iterator<Item = (MemberKey, &Member)> {
        self.members.iter().map(|(key, member)| (*key, member))
    }

    /// Every loan ever made, oldest first
    #[must_use]
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Lend a book to a member, starting now
    pub fn borrow_book(&mut self, book: BookKey, member: MemberKey) -> Option<LoanId> {
        self.borrow_book_at(book, member, Utc::now())
    }

    /// Lend a book to a member, starting at `now`.
    ///
    /// Only an available book can be lent. When the book is out, under
    /// maintenance or reserved, or either handle is unknown, nothing changes and
    /// `None` comes back.
    pub fn borrow_book_at(
        &mut self,
        book: BookKey,
        member: MemberKey,
        now: DateTime<Utc>,
    ) -> Option<LoanId> {
        let Some(status) = self.book(book).map(Book::status) else {
            warn!("LIBRARY: cannot lend unknown {book}");
            return None;
        };
        if !status.is_available() {
            warn!("LIBRARY: cannot lend {book}, status is {status}");
            return None;
        }
        if self.member(member).is_none() {
            warn!("LIBRARY: cannot lend to unknown {member}");
            return None;
        }
        let Some(due_date) = now.checked_add_signed(self.loan_period) else {
            warn!("LIBRARY: due date for a loan starting {now} is out of range");
            return None;
        };

        let id = LoanId::new(self.loans.len());
        self.loans.push(Loan::new(book, member, now, due_date));
        if let Some(stored) = self.book_mut(book) {
            stored.set_status(BookStatus::Borrowed);
        }
        if let Some(holder) = self.member_mut(member) {
            holder.add_loan(id);
        }
        info!("LIBRARY: {id} lends {book} to {member}, due {due_date}");
        Some(id)
    }

    /// Take a book back, stamping the return with the current time
    pub fn return_book(&mut self, loan: LoanId) -> bool {
        self.return_book_at(loan, Utc::now())
    }

    /// Take a book back at `now`.
    ///
    /// Does nothing and returns `false` unless the loan exists and is active.
    /// Otherwise the loan is stamped, the book becomes available (notifying
    /// interested members) and the loan leaves the member's held list. The
    /// loan itself stays in the history.
    pub fn return_book_at(&mut self, loan: LoanId, now: DateTime<Utc>) -> bool {
        let Some(record) = self.loans.get_mut(loan.index()) else {
            debug!("LIBRARY: no {loan} on record");
            return false;
        };
        if !record.mark_returned(now) {
            debug!("LIBRARY: {loan} was already returned");
            return false;
        }
        let (book, member) = (record.book(), record.member());

        self.transition_book(book, BookStatus::Available, now);
        if let Some(holder) = self.member_mut(member) {
            holder.remove_loan(loan);
        }
        info!("LIBRARY: {loan} returned");
        true
    }

    /// Move the due date of an active loan to `due_date`.
    ///
    /// Returns `false` and changes nothing if the loan is unknown, already
    /// returned, or `due_date` falls before the borrow date.
    pub fn renew_loan(&mut self, loan: LoanId, due_date: DateTime<Utc>) -> bool {
        let Some(record) = self.loans.get_mut(loan.index()) else {
            debug!("LIBRARY: no {loan} on record");
            return false;
        };
        if !record.is_active() {
            warn!("LIBRARY: cannot renew {loan}, it was returned");
            return false;
        }
        if due_date < record.borrow_date() {
            warn!("LIBRARY: cannot renew {loan} to {due_date}, before it was borrowed");
            return false;
        }
        record.set_due_date(due_date);
        info!("LIBRARY: {loan} renewed, due {due_date}");
        true
    }

    /// Change the status of a book directly, as of now
    pub fn set_book_status(&mut self, book: BookKey, status: BookStatus) -> Option<bool> {
        self.set_book_status_at(book, status, Utc::now())
    }

    /// Change the status of a book directly, as of `now`.
    ///
    /// Returns `None` for an unknown handle, otherwise whether the change
    /// made the book available and so ran a notification pass.
    pub fn set_book_status_at(
        &mut self,
        book: BookKey,
        status: BookStatus,
        now: DateTime<Utc>,
    ) -> Option<bool> {
        let announced = self.transition_book(book, status, now);
        if announced.is_none() {
            debug!("LIBRARY: no book stored as {book}");
        }
        announced
    }

    /// Apply a status change and, on a transition to available, notify
    /// observers. Returns `None` for an unknown handle.
    fn transition_book(
        &mut self,
        book: BookKey,
        status: BookStatus,
        now: DateTime<Utc>,
    ) -> Option<bool> {
        let became_available = self.book_mut(book)?.set_status(status);
        if became_available {
            self.announce_available(book, now);
        }
        Some(became_available)
    }

    /// Deliver one notice to every interested observer of `book`
    fn announce_available(&mut self, book: BookKey, now: DateTime<Utc>) {
        let Some((book_id, title)) =
            self.book(book).map(|b| (b.id().to_string(), b.title().to_string()))
        else {
            return;
        };

        let observers = self.registry.observers_of(book).to_vec();
        debug!("LIBRARY: {book_id} is available, {} observer(s) registered", observers.len());

        for observer in observers {
            if !self.registry.is_interested(observer, book) {
                debug!("LIBRARY: {observer} is no longer interested in {book_id}");
                continue;
            }
            let Some((_, member)) = self.members.iter_mut().find(|(k, _)| *k == observer) else {
                continue;
            };
            let notice = AvailabilityNotice {
                member_id: member.id().to_string(),
                member_name: member.name().to_string(),
                book_id: book_id.clone(),
                title: title.clone(),
                at: now,
            };
            for listener in &self.listeners {
                listener.on_available(&notice);
            }
            member.receive(notice);
        }
    }

    /// Register `member` for a notice whenever `book` becomes available.
    ///
    /// Returns `false` if either handle is unknown or the interest already
    /// existed.
    pub fn register_interest(&mut self, member: MemberKey, book: BookKey) -> bool {
        if self.member(member).is_none() || self.book(book).is_none() {
            return false;
        }
        let registered = self.registry.register(member, book);
        if registered {
            info!("LIBRARY: {member} is interested in {book}");
        }
        registered
    }

    /// Stop notifying `member` about `book`. Returns `false` if there was no
    /// such interest.
    pub fn withdraw_interest(&mut self, member: MemberKey, book: BookKey) -> bool {
        let withdrawn = self.registry.withdraw(member, book);
        if withdrawn {
            info!("LIBRARY: {member} is no longer interested in {book}");
        }
        withdrawn
    }

    /// Books `member` asked to hear about
    #[must_use]
    pub fn interests_of(&self, member: MemberKey) -> Vec<BookKey> {
        self.registry.interests_of(member)
    }

    /// Members waiting on `book`, in registration order
    #[must_use]
    pub fn observers_of(&self, book: BookKey) -> &[MemberKey] {
        self.registry.observers_of(book)
    }

    /// Counts over the current contents
    #[must_use]
    pub fn library_summary(&self) -> LibrarySummary {
        let count_status = |status: BookStatus| {
            self.books.iter().filter(|(_, book)| book.status() == status).count()
        };
        LibrarySummary {
            available_books: count_status(BookStatus::Available),
            borrowed_books: count_status(BookStatus::Borrowed),
            active_members: self.members.iter().filter(|(_, member)| member.has_loans()).count(),
            total_loans: self.loans.len(),
        }
    }

    /// Loans not yet returned, oldest first
    #[must_use]
    pub fn active_loans(&self) -> Vec<(LoanId, &Loan)> {
        self.loans_where(Loan::is_active)
    }

    /// Loans past their due date right now
    #[must_use]
    pub fn overdue_loans(&self) -> Vec<(LoanId, &Loan)> {
        self.overdue_loans_at(Utc::now())
    }

    /// Loans past their due date at `now`
    #[must_use]
    pub fn overdue_loans_at(&self, now: DateTime<Utc>) -> Vec<(LoanId, &Loan)> {
        self.loans_where(|loan| loan.is_overdue(now))
    }

    /// Loans matching `predicate`, with their ids
    fn loans_where(&self, predicate: impl Fn(&Loan) -> bool) -> Vec<(LoanId, &Loan)> {
        self.loans
            .iter()
            .enumerate()
            .filter(|(_, loan)| predicate(*loan))
            .map(|(index, loan)| (LoanId::new(index), loan))
            .collect()
    }
}

#[cfg(test)]
mod tests;
