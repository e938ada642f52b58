use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents the possible statuses of a catalogued book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    /// Book is on the shelf and can be borrowed
    #[default]
    Available,
    /// Book is out on an active loan
    Borrowed,
    /// Book is held back for a member
    Reserved,
    /// Book is being repaired or processed
    UnderMaintenance,
}

impl BookStatus {
    /// Every status, in declaration order
    pub const ALL: [Self; 4] =
        [Self::Available, Self::Borrowed, Self::Reserved, Self::UnderMaintenance];

    /// Get a human-readable description of the status
    #[must_use]
    pub fn get_description(self) -> &'static str {
        match self {
            Self::Available => "Book is available for borrowing",
            Self::Borrowed => "Book is out on loan",
            Self::Reserved => "Book is reserved",
            Self::UnderMaintenance => "Book is under maintenance",
        }
    }

    /// Whether a book in this status can be borrowed
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Available
    }

    /// Short lowercase tag used in scripts and reports
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Borrowed => "borrowed",
            Self::Reserved => "reserved",
            Self::UnderMaintenance => "under-maintenance",
        }
    }

    /// Parse a status tag, ignoring case and accepting `_` for `-`
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|status| status.tag() == normalized)
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Available => "AVAILABLE",
            Self::Borrowed => "BORROWED",
            Self::Reserved => "RESERVED",
            Self::UnderMaintenance => "UNDER_MAINTENANCE",
        };
        f.write_str(name)
    }
}
