#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::TimeDelta;
use pretty_assertions::assert_eq;

use crate::{
    config::LibraryConfig,
    error::LibraryError,
    manager::LibraryManager,
    status::BookStatus,
    summary::LibrarySummary,
};

/// Helper function to set up a manager with three books and two members
fn setup_test_manager() -> LibraryManager {
    let mut manager = LibraryManager::new();
    manager
        .add_book("fiction", "B001", "The Great Gatsby", "F. Scott Fitzgerald", 1925)
        .expect("valid fiction book");
    manager
        .add_book("non-fiction", "B002", "A Brief History of Time", "Stephen Hawking", 1988)
        .expect("valid non-fiction book");
    manager
        .add_book("reference", "B003", "Oxford English Dictionary", "Oxford University Press", 2010)
        .expect("valid reference book");
    manager.add_member("M001", "John Doe");
    manager.add_member("M002", "Jane Smith");
    manager
}

#[test]
fn test_summary_of_fresh_catalog() {
    let manager = setup_test_manager();
    assert_eq!(
        manager.library_summary(),
        LibrarySummary { available_books: 3, borrowed_books: 0, active_members: 0, total_loans: 0 }
    );
}

#[test]
fn test_add_book_rejects_bad_input_without_storing() {
    let mut manager = LibraryManager::new();

    let err = manager.add_book("comic", "C1", "Title", "Author", 2020).expect_err("unknown kind");
    assert!(matches!(err, LibraryError::UnknownBookType(ref tag) if tag == "comic"));
    assert!(manager.add_book("fiction", "", "Title", "Author", 2020).is_err());

    assert_eq!(manager.books().count(), 0);
}

#[test]
fn test_borrow_and_return_round() {
    let mut manager = setup_test_manager();

    assert!(manager.borrow_book("B001", "M001"));
    assert_eq!(manager.find_book("B001").unwrap().status(), BookStatus::Borrowed);
    assert_eq!(manager.find_member("M001").unwrap().loans().len(), 1);

    assert!(manager.return_book("B001"));
    assert_eq!(manager.find_book("B001").unwrap().status(), BookStatus::Available);
    assert!(manager.find_member("M001").unwrap().loans().is_empty());

    let history = manager.library().loans();
    assert_eq!(history.len(), 1);
    assert!(history.first().and_then(|loan| loan.return_date()).is_some());
}

#[test]
fn test_borrow_requires_known_ids_and_available_book() {
    let mut manager = setup_test_manager();

    assert!(!manager.borrow_book("B999", "M001"));
    assert!(!manager.borrow_book("B001", "M999"));
    assert!(manager.borrow_book("B001", "M001"));
    assert!(!manager.borrow_book("B001", "M002"));

    assert_eq!(manager.library_summary().total_loans, 1);
    assert!(manager.find_member("M002").unwrap().loans().is_empty());
}

#[test]
fn test_return_without_active_loan_fails_every_time() {
    let mut manager = setup_test_manager();

    assert!(!manager.return_book("B999"));
    for _ in 0..3 {
        assert!(!manager.return_book("B002"));
    }

    assert!(manager.borrow_book("B002", "M002"));
    assert!(manager.return_book("B002"));
    for _ in 0..3 {
        assert!(!manager.return_book("B002"));
    }
    assert_eq!(manager.library_summary().total_loans, 1);
}

#[test]
fn test_return_of_book_marked_borrowed_without_loan() {
    let mut manager = setup_test_manager();
    assert!(manager.set_book_status("B002", BookStatus::Borrowed));

    assert!(!manager.return_book("B002"));
    assert_eq!(manager.find_book("B002").unwrap().status(), BookStatus::Borrowed);
}

#[test]
fn test_remove_book_and_member() {
    let mut manager = setup_test_manager();

    assert!(manager.remove_book("B003"));
    assert!(!manager.remove_book("B003"));
    assert!(manager.find_book("B003").is_none());

    assert!(manager.remove_member("M002"));
    assert!(!manager.remove_member("M002"));
    assert_eq!(manager.members().count(), 1);
}

#[test]
fn test_duplicate_book() {
    let mut manager = setup_test_manager();
    assert!(manager.register_interest("M002", "B001"));
    assert!(manager.borrow_book("B001", "M001"));

    let new_id = manager.duplicate_book("B001").expect("source exists");
    assert_eq!(new_id, "B001_copy");

    let original = manager.find_book("B001").unwrap();
    let copy = manager.find_book(&new_id).expect("copy is stored");
    assert_eq!(copy.title(), original.title());
    assert_eq!(copy.author(), original.author());
    assert_eq!(copy.publication_year(), original.publication_year());
    assert_eq!(copy.status(), original.status());
    assert_eq!(copy.kind(), original.kind());

    let (copy_key, _) = manager.library().find_book_by_id(&new_id).unwrap();
    assert!(manager.library().observers_of(copy_key).is_empty());
    assert_eq!(manager.books().count(), 4);
}

#[test]
fn test_duplicate_missing_book() {
    let mut manager = setup_test_manager();
    assert_eq!(manager.duplicate_book("B404"), None);
    assert_eq!(manager.books().count(), 3);
}

#[test]
fn test_duplicate_uses_configured_suffix() {
    let config = LibraryConfig { copy_suffix: "-2".to_string(), ..LibraryConfig::default() };
    let mut manager = LibraryManager::with_config(config).expect("valid config");
    manager.add_book("fiction", "F1", "Title", "Author", 1999).expect("valid book");

    assert_eq!(manager.duplicate_book("F1").as_deref(), Some("F1-2"));
}

#[test]
fn test_with_config_sets_loan_period() {
    let config = LibraryConfig { loan_period_days: 21, ..LibraryConfig::default() };
    let mut manager = LibraryManager::with_config(config).expect("valid config");
    manager.add_book("fiction", "F1", "Title", "Author", 1999).expect("valid book");
    manager.add_member("M1", "Reader");

    assert!(manager.borrow_book("F1", "M1"));
    let (_, loan) = manager.active_loans().into_iter().next().expect("one loan");
    assert_eq!(loan.due_date() - loan.borrow_date(), TimeDelta::days(21));
}

#[test]
fn test_with_config_rejects_invalid_config() {
    let config = LibraryConfig { loan_period_days: 0, ..LibraryConfig::default() };
    let err = LibraryManager::with_config(config).expect_err("zero-day loans");
    assert!(matches!(err, LibraryError::Config(_)));
}

#[test]
fn test_interest_round() {
    let mut manager = setup_test_manager();

    assert!(!manager.register_interest("M404", "B001"));
    assert!(!manager.register_interest("M001", "B404"));
    assert!(manager.register_interest("M002", "B001"));
    assert!(!manager.register_interest("M002", "B001"));

    assert!(manager.borrow_book("B001", "M001"));
    assert!(manager.return_book("B001"));
    assert_eq!(manager.find_member("M002").unwrap().notices().len(), 1);
    assert!(manager.find_member("M001").unwrap().notices().is_empty());

    assert!(manager.withdraw_interest("M002", "B001"));
    assert!(!manager.withdraw_interest("M002", "B001"));
    assert!(manager.borrow_book("B001", "M001"));
    assert!(manager.return_book("B001"));
    assert_eq!(manager.find_member("M002").unwrap().notices().len(), 1);
}

#[test]
fn test_set_book_status() {
    let mut manager = setup_test_manager();
    manager.register_interest("M001", "B002");

    assert!(manager.set_book_status("B002", BookStatus::UnderMaintenance));
    assert!(!manager.borrow_book("B002", "M002"));
    assert!(manager.set_book_status("B002", BookStatus::Available));
    assert_eq!(manager.find_member("M001").unwrap().notices().len(), 1);

    assert!(!manager.set_book_status("B404", BookStatus::Reserved));
}

#[test]
fn test_overdue_loans() {
    let mut manager = setup_test_manager();
    assert!(manager.borrow_book("B001", "M001"));
    let (_, loan) = manager.active_loans().into_iter().next().expect("one loan");
    let due = loan.due_date();

    assert!(manager.overdue_loans_at(due).is_empty());
    assert_eq!(manager.overdue_loans_at(due + TimeDelta::hours(1)).len(), 1);
    assert!(manager.overdue_loans().is_empty());
}

#[test]
fn test_renew_loan_adds_one_loan_period() {
    let mut manager = setup_test_manager();
    assert!(!manager.renew_loan("B001"));
    assert!(manager.borrow_book("B001", "M001"));
    let (_, loan) = manager.active_loans().into_iter().next().expect("one loan");
    let first_due = loan.due_date();

    assert!(manager.renew_loan("B001"));
    let (_, loan) = manager.active_loans().into_iter().next().expect("one loan");
    assert_eq!(loan.due_date(), first_due + TimeDelta::days(14));

    assert!(manager.return_book("B001"));
    assert!(!manager.renew_loan("B001"));
    assert!(!manager.renew_loan("B404"));
}
