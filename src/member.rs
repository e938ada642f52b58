use std::fmt;

use serde::Serialize;

use crate::{loan::LoanId, notify::AvailabilityNotice};

/// Repository handle for a stored member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberKey(u64);

impl MemberKey {
    /// Wrap a raw handle value
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// A library member
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Membership identifier
    id: String,
    /// Display name
    name: String,
    /// Loans currently held, oldest first
    loans: Vec<LoanId>,
    /// Availability notices received, oldest first
    inbox: Vec<AvailabilityNotice>,
}

impl Member {
    /// Create a member holding no loans
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), loans: Vec::new(), inbox: Vec::new() }
    }

    /// Membership identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loans currently held
    #[must_use]
    pub fn loans(&self) -> &[LoanId] {
        &self.loans
    }

    /// Whether the member holds at least one loan
    #[must_use]
    pub fn has_loans(&self) -> bool {
        !self.loans.is_empty()
    }

    /// Availability notices received so far
    #[must_use]
    pub fn notices(&self) -> &[AvailabilityNotice] {
        &self.inbox
    }

    /// Record a newly created loan
    pub(crate) fn add_loan(&mut self, loan: LoanId) {
        self.loans.push(loan);
    }

    /// Drop a loan from the held list, returning whether it was held
    pub(crate) fn remove_loan(&mut self, loan: LoanId) -> bool {
        match self.loans.iter().position(|held| *held == loan) {
            Some(pos) => {
                self.loans.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Deliver an availability notice
    pub(crate) fn receive(&mut self, notice: AvailabilityNotice) {
        self.inbox.push(notice);
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (loans: {})", self.id, self.name, self.loans.len())
    }
}
