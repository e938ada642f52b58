#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;

use crate::{
    book::{Book, BookKey, BookKind},
    library::Library,
    member::{Member, MemberKey},
    notify::{AvailabilityListener, AvailabilityNotice},
    status::BookStatus,
    summary::LibrarySummary,
};

/// Fixed instant the tests borrow at
fn borrow_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

/// A library with one fiction book and one member
fn setup_test_library() -> (Library, BookKey, MemberKey) {
    let mut library = Library::new();
    let book = library.add_book(Book::new(
        "B001",
        "The Great Gatsby",
        "F. Scott Fitzgerald",
        1925,
        BookKind::Fiction { genre: "Classic".to_string() },
    ));
    let member = library.add_member(Member::new("M001", "John Doe"));
    (library, book, member)
}

/// Collects every notice it sees
#[derive(Debug, Clone, Default)]
struct RecordingListener {
    /// Notices seen so far
    seen: Arc<Mutex<Vec<AvailabilityNotice>>>,
}

impl AvailabilityListener for RecordingListener {
    fn on_available(&self, notice: &AvailabilityNotice) {
        self.seen.lock().unwrap().push(notice.clone());
    }
}

#[test]
fn test_borrow_available_book() {
    let (mut library, book, member) = setup_test_library();

    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("book is available");

    let loan = library.loan(loan_id).expect("loan is recorded");
    assert_eq!(loan.book(), book);
    assert_eq!(loan.member(), member);
    assert_eq!(loan.borrow_date(), borrow_time());
    assert_eq!(loan.due_date(), borrow_time() + TimeDelta::days(14));
    assert!(loan.is_active());
    assert_eq!(library.book(book).unwrap().status(), BookStatus::Borrowed);
    assert_eq!(library.member(member).unwrap().loans(), &[loan_id]);
}

#[test]
fn test_borrow_unavailable_book_changes_nothing() {
    let (mut library, book, member) = setup_test_library();
    let other = library.add_member(Member::new("M002", "Jane Smith"));
    library.borrow_book_at(book, member, borrow_time()).expect("first loan");

    assert_eq!(library.borrow_book_at(book, other, borrow_time()), None);
    assert_eq!(library.loans().len(), 1);
    assert!(library.member(other).unwrap().loans().is_empty());

    for status in [BookStatus::Reserved, BookStatus::UnderMaintenance] {
        let (mut library, book, member) = setup_test_library();
        library.set_book_status(book, status);
        assert_eq!(library.borrow_book(book, member), None);
        assert_eq!(library.book(book).unwrap().status(), status);
        assert!(library.loans().is_empty());
    }
}

#[test]
fn test_borrow_with_unknown_handle() {
    let (mut library, book, member) = setup_test_library();
    assert!(library.remove_member(member));

    assert_eq!(library.borrow_book(book, member), None);
    assert_eq!(library.book(book).unwrap().status(), BookStatus::Available);
}

#[test]
fn test_return_active_loan() {
    let (mut library, book, member) = setup_test_library();
    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("loan");
    let returned_at = borrow_time() + TimeDelta::days(3);

    assert!(library.return_book_at(loan_id, returned_at));

    let loan = library.loan(loan_id).expect("loan stays in history");
    assert_eq!(loan.return_date(), Some(returned_at));
    assert!(!loan.is_active());
    assert_eq!(library.book(book).unwrap().status(), BookStatus::Available);
    assert!(library.member(member).unwrap().loans().is_empty());
    assert_eq!(library.loans().len(), 1);
}

#[test]
fn test_return_is_idempotent() {
    let (mut library, book, member) = setup_test_library();
    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("loan");
    let first_return = borrow_time() + TimeDelta::days(1);
    assert!(library.return_book_at(loan_id, first_return));

    for _ in 0..3 {
        assert!(!library.return_book(loan_id));
    }
    assert_eq!(library.loan(loan_id).unwrap().return_date(), Some(first_return));
}

#[test]
fn test_summary_counts() {
    let (mut library, book, member) = setup_test_library();
    library.add_book(Book::new(
        "B002",
        "A Brief History of Time",
        "Stephen Hawking",
        1988,
        BookKind::NonFiction { subject: "Physics".to_string() },
    ));
    library.add_member(Member::new("M002", "Jane Smith"));

    assert_eq!(
        library.library_summary(),
        LibrarySummary { available_books: 2, borrowed_books: 0, active_members: 0, total_loans: 0 }
    );

    let loan_id = library.borrow_book(book, member).expect("loan");
    assert_eq!(
        library.library_summary(),
        LibrarySummary { available_books: 1, borrowed_books: 1, active_members: 1, total_loans: 1 }
    );

    assert!(library.return_book(loan_id));
    assert_eq!(
        library.library_summary(),
        LibrarySummary { available_books: 2, borrowed_books: 0, active_members: 0, total_loans: 1 }
    );
}

#[test]
fn test_active_and_overdue_views() {
    let (mut library, book, member) = setup_test_library();
    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("loan");
    let due = library.loan(loan_id).unwrap().due_date();

    assert_eq!(library.active_loans().len(), 1);
    assert!(library.overdue_loans_at(due).is_empty());
    let overdue = library.overdue_loans_at(due + TimeDelta::seconds(1));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue.first().map(|(id, _)| *id), Some(loan_id));

    assert!(library.return_book_at(loan_id, due + TimeDelta::days(2)));
    assert!(library.active_loans().is_empty());
    assert!(library.overdue_loans_at(due + TimeDelta::days(30)).is_empty());
}

#[test]
fn test_custom_loan_period() {
    let mut library = Library::with_loan_period(TimeDelta::days(7));
    let book = library.add_book(Book::new(
        "R1",
        "Atlas",
        "Cartographer",
        2001,
        BookKind::Reference { can_be_borrowed: true },
    ));
    let member = library.add_member(Member::new("M1", "Reader"));

    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("loan");
    assert_eq!(library.loan(loan_id).unwrap().due_date(), borrow_time() + TimeDelta::days(7));
}

#[test]
fn test_duplicate_ids_resolve_to_first_match() {
    let (mut library, first, _) = setup_test_library();
    let second = library.add_book(Book::new(
        "B001",
        "Another Gatsby",
        "Someone Else",
        2000,
        BookKind::Fiction { genre: "Parody".to_string() },
    ));
    assert_ne!(first, second);

    let (found, book) = library.find_book_by_id("B001").expect("lookup");
    assert_eq!(found, first);
    assert_eq!(book.title(), "The Great Gatsby");

    assert!(library.remove_book(first));
    let (found, _) = library.find_book_by_id("B001").expect("second remains");
    assert_eq!(found, second);
    assert!(!library.remove_book(first));
}

#[test]
fn test_removing_a_lent_book_leaves_the_loan() {
    let (mut library, book, member) = setup_test_library();
    let loan_id = library.borrow_book(book, member).expect("loan");

    assert!(library.remove_book(book));
    assert!(library.book(book).is_none());
    assert_eq!(library.active_loans().len(), 1);
    assert_eq!(library.loan(loan_id).unwrap().book(), book);

    assert!(library.return_book(loan_id));
    assert!(library.member(member).unwrap().loans().is_empty());
}

#[test]
fn test_interested_member_is_notified_once_per_availability() {
    let (mut library, book, member) = setup_test_library();
    let borrower = library.add_member(Member::new("M002", "Jane Smith"));
    let listener = RecordingListener::default();
    library.add_listener(Box::new(listener.clone()));
    assert!(library.register_interest(member, book));
    assert!(!library.register_interest(member, book));

    let loan_id = library.borrow_book_at(book, borrower, borrow_time()).expect("loan");
    assert!(library.member(member).unwrap().notices().is_empty());

    let returned_at = borrow_time() + TimeDelta::days(2);
    assert!(library.return_book_at(loan_id, returned_at));

    let notices = library.member(member).unwrap().notices();
    assert_eq!(notices.len(), 1);
    let notice = notices.first().expect("one notice");
    assert_eq!(notice.member_id, "M001");
    assert_eq!(notice.book_id, "B001");
    assert_eq!(notice.title, "The Great Gatsby");
    assert_eq!(notice.at, returned_at);
    assert!(library.member(borrower).unwrap().notices().is_empty());
    assert_eq!(listener.seen.lock().unwrap().len(), 1);
}

#[test]
fn test_no_notice_without_a_transition_to_available() {
    let (mut library, book, member) = setup_test_library();
    library.register_interest(member, book);

    assert_eq!(library.set_book_status(book, BookStatus::Available), Some(false));
    assert_eq!(library.set_book_status(book, BookStatus::Reserved), Some(false));
    assert_eq!(library.set_book_status(book, BookStatus::UnderMaintenance), Some(false));
    assert!(library.member(member).unwrap().notices().is_empty());

    assert_eq!(library.set_book_status(book, BookStatus::Available), Some(true));
    assert_eq!(library.set_book_status(book, BookStatus::Available), Some(false));
    assert_eq!(library.member(member).unwrap().notices().len(), 1);
}

#[test]
fn test_withdrawn_and_removed_members_are_not_notified() {
    let (mut library, book, member) = setup_test_library();
    let other = library.add_member(Member::new("M002", "Jane Smith"));
    library.register_interest(member, book);
    library.register_interest(other, book);
    assert_eq!(library.observers_of(book), &[member, other]);

    assert!(library.withdraw_interest(member, book));
    assert!(library.remove_member(other));
    assert!(library.observers_of(book).is_empty());

    library.set_book_status(book, BookStatus::UnderMaintenance);
    library.set_book_status(book, BookStatus::Available);
    assert!(library.member(member).unwrap().notices().is_empty());
    assert!(library.interests_of(member).is_empty());
}

#[test]
fn test_set_status_on_unknown_book() {
    let (mut library, book, _) = setup_test_library();
    assert!(library.remove_book(book));
    assert_eq!(library.set_book_status(book, BookStatus::Reserved), None);
}

#[test]
fn test_renew_active_loan() {
    let (mut library, book, member) = setup_test_library();
    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("loan");
    let later = borrow_time() + TimeDelta::days(28);

    assert!(library.renew_loan(loan_id, later));
    assert_eq!(library.loan(loan_id).unwrap().due_date(), later);
    assert!(library.overdue_loans_at(borrow_time() + TimeDelta::days(20)).is_empty());

    assert!(!library.renew_loan(loan_id, borrow_time() - TimeDelta::days(1)));
    assert_eq!(library.loan(loan_id).unwrap().due_date(), later);
}

#[test]
fn test_returned_loan_cannot_be_renewed() {
    let (mut library, book, member) = setup_test_library();
    let loan_id = library.borrow_book_at(book, member, borrow_time()).expect("loan");
    let due = library.loan(loan_id).unwrap().due_date();
    assert!(library.return_book_at(loan_id, borrow_time() + TimeDelta::days(1)));

    assert!(!library.renew_loan(loan_id, due + TimeDelta::days(14)));
    assert_eq!(library.loan(loan_id).unwrap().due_date(), due);
}
