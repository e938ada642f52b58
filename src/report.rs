use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::library::Library;

/// Plain-text views of a library for presentation layers
#[derive(Debug)]
pub struct CatalogReport;

impl CatalogReport {
    /// One line per book, in insertion order, with a note on why it cannot be
    /// lent and its interested members
    #[must_use]
    pub fn render_catalog(library: &Library) -> String {
        let mut out = String::from("=== Catalog ===\n");
        let mut empty = true;
        for (key, book) in library.books() {
            empty = false;
            let _ = writeln!(out, "{book}");
            if !book.status().is_available() {
                let _ = writeln!(out, "  note: {}", book.status().get_description());
            }
            let waiting: Vec<&str> = library
                .observers_of(key)
                .iter()
                .filter_map(|member| library.member(*member))
                .map(|member| member.id())
                .collect();
            if !waiting.is_empty() {
                let _ = writeln!(out, "  waiting: {}", waiting.join(", "));
            }
        }
        if empty {
            out.push_str("(no books)\n");
        }
        out
    }

    /// One line per member with the titles they hold
    #[must_use]
    pub fn render_members(library: &Library) -> String {
        let mut out = String::from("=== Members ===\n");
        let mut empty = true;
        for (_, member) in library.members() {
            empty = false;
            let held: Vec<&str> = member
                .loans()
                .iter()
                .filter_map(|loan| library.loan(*loan))
                .map(|loan| library.book(loan.book()).map_or("(removed book)", |book| book.title()))
                .collect();
            let _ = write!(out, "{member}");
            if !held.is_empty() {
                let _ = write!(out, ": {}", held.join(", "));
            }
            out.push('\n');
        }
        if empty {
            out.push_str("(no members)\n");
        }
        out
    }

    /// Every loan in the history, flagging those overdue at `now`
    #[must_use]
    pub fn render_loans(library: &Library, now: DateTime<Utc>) -> String {
        let mut out = String::from("=== Loans ===\n");
        if library.loans().is_empty() {
            out.push_str("(no loans)\n");
            return out;
        }
        for (index, loan) in library.loans().iter().enumerate() {
            let book = library.book(loan.book()).map_or("(removed book)", |book| book.id());
            let member =
                library.member(loan.member()).map_or("(removed member)", |member| member.id());
            let state = match loan.return_date() {
                Some(returned) => format!("returned {}", returned.format("%Y-%m-%d")),
                None if loan.is_overdue(now) => "OVERDUE".to_string(),
                None => "active".to_string(),
            };
            let _ = writeln!(
                out,
                "{index}. {book} -> {member}, borrowed {}, due {}, {state}",
                loan.borrow_date().format("%Y-%m-%d"),
                loan.due_date().format("%Y-%m-%d"),
            );
        }
        out
    }
}
