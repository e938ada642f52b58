//! In-memory library catalog and loan tracker.
//!
//! This crate keeps books, members and loans in memory, lends and takes back
//! books, and tells interested members when a book becomes available again.
//! [`LibraryManager`] is the entry point for callers working in catalog ids;
//! [`Library`] is the store underneath it.

pub mod book;
pub mod config;
pub mod error;
pub mod factory;
pub mod library;
pub mod loan;
pub mod manager;
pub mod member;
pub mod notify;
pub mod report;
pub mod script;
pub mod status;
pub mod summary;

pub use book::{Book, BookKey, BookKind};
pub use config::LibraryConfig;
pub use error::{Field, LibraryError, Result};
pub use library::Library;
pub use loan::{Loan, LoanId};
pub use manager::{LibraryManager, SharedLibraryManager};
pub use member::{Member, MemberKey};
pub use notify::{AvailabilityListener, AvailabilityNotice, LoggingListener};
pub use report::CatalogReport;
pub use status::BookStatus;
pub use summary::LibrarySummary;
