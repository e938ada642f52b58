//! A line-oriented command language over [`LibraryManager`].
//!
//! One command per line, fields separated by `|`, surrounding whitespace
//! ignored. Blank lines and lines starting with `#` are skipped. Lines run
//! in order as they are parsed, so a line with bad input is reported and
//! skipped while the rest of the script still runs.
//!
//! ```text
//! add-book | fiction | B004 | Dune | Frank Herbert | 1965
//! add-member | M003 | Ada Lovelace
//! borrow | B004 | M003
//! ```

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use chrono::Utc;
use log::warn;

use crate::{
    error::{LibraryError, Result},
    manager::LibraryManager,
    report::CatalogReport,
    status::BookStatus,
};

/// Highest publication year a script may give
pub const MAX_YEAR: i32 = 9999;

/// One parsed script command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add-book | kind | id | title | author | year`
    AddBook {
        /// Kind tag, passed through to the factory
        kind: String,
        /// Book id
        id: String,
        /// Title
        title: String,
        /// Author
        author: String,
        /// Publication year
        year: i32,
    },
    /// `remove-book | id`
    RemoveBook {
        /// Book id
        id: String,
    },
    /// `add-member | id | name`
    AddMember {
        /// Member id
        id: String,
        /// Display name
        name: String,
    },
    /// `remove-member | id`
    RemoveMember {
        /// Member id
        id: String,
    },
    /// `borrow | book id | member id`
    Borrow {
        /// Book id
        book_id: String,
        /// Member id
        member_id: String,
    },
    /// `return | book id`
    Return {
        /// Book id
        book_id: String,
    },
    /// `renew | book id`
    Renew {
        /// Book id
        book_id: String,
    },
    /// `duplicate | book id`
    Duplicate {
        /// Book id
        book_id: String,
    },
    /// `interest | member id | book id`
    Interest {
        /// Member id
        member_id: String,
        /// Book id
        book_id: String,
    },
    /// `withdraw | member id | book id`
    Withdraw {
        /// Member id
        member_id: String,
        /// Book id
        book_id: String,
    },
    /// `status | book id | status`
    Status {
        /// Book id
        book_id: String,
        /// New status
        status: BookStatus,
    },
    /// `summary`
    Summary,
    /// `catalog`
    Catalog,
    /// `loans`
    Loans,
}

/// What running a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command took effect
    Done(String),
    /// The command was understood but did not apply to the current state
    Rejected(String),
    /// A read-only view
    Report(String),
    /// The line carried malformed input and was skipped
    Invalid(LibraryError),
}

/// Parse a publication year
///
/// # Errors
///
/// Returns `LibraryError::InvalidYear` unless `raw` is a whole number in
/// `0..=9999`.
pub fn parse_year(raw: &str) -> Result<i32> {
    let trimmed = raw.trim();
    match trimmed.parse::<i32>() {
        Ok(year) if (0..=MAX_YEAR).contains(&year) => Ok(year),
        _ => Err(LibraryError::InvalidYear(trimmed.to_string())),
    }
}

/// Parse one script line. Blank lines and comments yield `None`.
///
/// # Errors
///
/// Returns `LibraryError::Script` for an unknown command or a wrong number of
/// fields, and `LibraryError::InvalidYear` or `LibraryError::Script` for a bad
/// year or status.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<String> = line.split('|').map(|field| field.trim().to_string()).collect();
    let script_error = |message: String| LibraryError::Script { line: line_number, message };

    let Some((name, args)) = fields.split_first() else {
        return Ok(None);
    };
    let name = name.to_ascii_lowercase();
    let Some(expected) = arity(&name) else {
        return Err(script_error(format!("unknown command '{name}'")));
    };
    if args.len() != expected {
        return Err(script_error(format!(
            "'{name}' takes {expected} field(s), got {}",
            args.len()
        )));
    }

    let command = match (name.as_str(), args) {
        ("add-book", [kind, id, title, author, year]) => Command::AddBook {
            kind: kind.clone(),
            id: id.clone(),
            title: title.clone(),
            author: author.clone(),
            year: parse_year(year)?,
        },
        ("remove-book", [id]) => Command::RemoveBook { id: id.clone() },
        ("add-member", [id, member_name]) => {
            Command::AddMember { id: id.clone(), name: member_name.clone() }
        }
        ("remove-member", [id]) => Command::RemoveMember { id: id.clone() },
        ("borrow", [book_id, member_id]) => {
            Command::Borrow { book_id: book_id.clone(), member_id: member_id.clone() }
        }
        ("return", [book_id]) => Command::Return { book_id: book_id.clone() },
        ("renew", [book_id]) => Command::Renew { book_id: book_id.clone() },
        ("duplicate", [book_id]) => Command::Duplicate { book_id: book_id.clone() },
        ("interest", [member_id, book_id]) => {
            Command::Interest { member_id: member_id.clone(), book_id: book_id.clone() }
        }
        ("withdraw", [member_id, book_id]) => {
            Command::Withdraw { member_id: member_id.clone(), book_id: book_id.clone() }
        }
        ("status", [book_id, status]) => Command::Status {
            book_id: book_id.clone(),
            status: BookStatus::from_tag(status)
                .ok_or_else(|| script_error(format!("unknown status '{status}'")))?,
        },
        ("summary", []) => Command::Summary,
        ("catalog", []) => Command::Catalog,
        ("loans", []) => Command::Loans,
        _ => return Err(script_error(format!("cannot parse '{line}'"))),
    };
    Ok(Some(command))
}

/// Number of `|`-separated fields after the command name
fn arity(name: &str) -> Option<usize> {
    match name {
        "summary" | "catalog" | "loans" => Some(0),
        "remove-book" | "remove-member" | "return" | "renew" | "duplicate" => Some(1),
        "add-member" | "borrow" | "interest" | "withdraw" | "status" => Some(2),
        "add-book" => Some(5),
        _ => None,
    }
}

/// Read a script from `path`, where `-` means stdin
///
/// # Errors
///
/// Returns `LibraryError::Io` if the source cannot be read.
pub fn read_source(path: &Path) -> Result<String> {
    let contents = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map(|_| buffer)
    } else {
        fs::read_to_string(path)
    };
    contents.map_err(|e| LibraryError::Io(format!("Failed to read {}: {e}", path.display())))
}

/// Parse and run a script line by line, handing each outcome to `on_outcome`
/// with its one-based line number.
///
/// Invalid input on a line, from parsing or from running it, becomes an
/// [`Outcome::Invalid`] and the script carries on.
///
/// # Errors
///
/// Returns the first `LibraryError::Script` error. Lines before it have run.
pub fn run_script(
    manager: &mut LibraryManager,
    source: &str,
    mut on_outcome: impl FnMut(usize, Outcome),
) -> Result<()> {
    for (number, line) in (1..).zip(source.lines()) {
        let result = match parse_line(number, line) {
            Ok(Some(command)) => execute(manager, command),
            Ok(None) => continue,
            Err(err) => Err(err),
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) if err.is_invalid_argument() => {
                warn!("SCRIPT: skipping line {number}: {err}");
                Outcome::Invalid(err)
            }
            Err(err) => return Err(err),
        };
        on_outcome(number, outcome);
    }
    Ok(())
}

/// Turn a business-rule result into an outcome
fn outcome(applied: bool, done: String, rejected: String) -> Outcome {
    if applied { Outcome::Done(done) } else { Outcome::Rejected(rejected) }
}

/// Run one command against `manager`
///
/// # Errors
///
/// Only `add-book` can fail, with the factory's error for bad input.
pub fn execute(manager: &mut LibraryManager, command: Command) -> Result<Outcome> {
    let result = match command {
        Command::AddBook { kind, id, title, author, year } => {
            manager.add_book(&kind, &id, &title, &author, year)?;
            Outcome::Done(format!("added book {id}"))
        }
        Command::RemoveBook { id } => outcome(
            manager.remove_book(&id),
            format!("removed book {id}"),
            format!("no book {id}"),
        ),
        Command::AddMember { id, name } => {
            manager.add_member(&id, &name);
            Outcome::Done(format!("added member {id} ({name})"))
        }
        Command::RemoveMember { id } => outcome(
            manager.remove_member(&id),
            format!("removed member {id}"),
            format!("no member {id}"),
        ),
        Command::Borrow { book_id, member_id } => outcome(
            manager.borrow_book(&book_id, &member_id),
            format!("{member_id} borrowed {book_id}"),
            format!("{book_id} cannot be lent to {member_id}"),
        ),
        Command::Return { book_id } => outcome(
            manager.return_book(&book_id),
            format!("{book_id} returned"),
            format!("{book_id} has no active loan"),
        ),
        Command::Renew { book_id } => outcome(
            manager.renew_loan(&book_id),
            format!("{book_id} renewed"),
            format!("{book_id} has no active loan"),
        ),
        Command::Duplicate { book_id } => match manager.duplicate_book(&book_id) {
            Some(new_id) => Outcome::Done(format!("duplicated {book_id} as {new_id}")),
            None => Outcome::Rejected(format!("no book {book_id}")),
        },
        Command::Interest { member_id, book_id } => outcome(
            manager.register_interest(&member_id, &book_id),
            format!("{member_id} will hear when {book_id} is available"),
            format!("cannot register {member_id} for {book_id}"),
        ),
        Command::Withdraw { member_id, book_id } => outcome(
            manager.withdraw_interest(&member_id, &book_id),
            format!("{member_id} no longer follows {book_id}"),
            format!("{member_id} was not following {book_id}"),
        ),
        Command::Status { book_id, status } => outcome(
            manager.set_book_status(&book_id, status),
            format!("{book_id} is now {status}"),
            format!("no book {book_id}"),
        ),
        Command::Summary => Outcome::Report(manager.library_summary().to_string()),
        Command::Catalog => Outcome::Report(CatalogReport::render_catalog(manager.library())),
        Command::Loans => {
            Outcome::Report(CatalogReport::render_loans(manager.library(), Utc::now()))
        }
    };
    Ok(result)
}
