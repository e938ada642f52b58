use std::fmt;

use serde::{Deserialize, Serialize};

/// Point-in-time counts over the catalog, computed on demand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct LibrarySummary {
    /// Books whose status is available
    pub available_books: usize,
    /// Books whose status is borrowed
    pub borrowed_books: usize,
    /// Members holding at least one loan
    pub active_members: usize,
    /// Loans ever created, returned or not
    pub total_loans: usize,
}

impl fmt::Display for LibrarySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "available books: {}, borrowed books: {}, active members: {}, total loans: {}",
            self.available_books, self.borrowed_books, self.active_members, self.total_loans
        )
    }
}
