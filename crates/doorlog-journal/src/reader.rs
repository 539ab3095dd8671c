//! Full-file journal parsing.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use doorlog_core::{Event, EventKind, IdentityHash, LocationRegistry, User};
use tracing::warn;

use crate::errors::ReadError;

/// Read-only representation of one parsed journal file.
///
/// Holds every registered user keyed by identity hash and the full event
/// sequence in file order. The file order is also append order; it is not
/// guaranteed monotonic by timestamp, since timestamps are wall-clock at
/// write time.
#[derive(Debug, Default)]
pub struct Journal {
    users: HashMap<IdentityHash, User>,
    events: Vec<Event>,
}

impl Journal {
    /// Iterates over all registered users, in no particular order.
    ///
    /// The iterator borrows the journal and can be re-created at will.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Resolves an identity hash to its registered user.
    pub fn user(&self, hash: &IdentityHash) -> Option<&User> {
        self.users.get(hash)
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// All events in file order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Reads a journal file into an immutable [`Journal`].
///
/// Lines are dispatched on their first byte: `*` registers a user, `+`/`-`
/// record events resolved against the users seen so far and the given
/// location registry. A malformed event line is logged and skipped, so one
/// corrupt record does not hide the rest of the journal. A malformed user
/// line is fatal, because every later event for that identity would fail to
/// resolve.
///
/// # Errors
///
/// Returns [`ReadError`] if the path is not a regular file, the file cannot
/// be read, or a user line fails to parse.
pub fn read_journal(
    path: impl AsRef<Path>,
    registry: &LocationRegistry,
) -> Result<Journal, ReadError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(ReadError::NotAFile(path.to_path_buf()));
    }
    let file = File::open(path)?;

    let mut journal = Journal::default();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let Some(&first) = line.as_bytes().first() else {
            continue;
        };
        if first == b'*' {
            let user =
                User::parse_journal_line(&line[1..]).map_err(|source| ReadError::UserLine {
                    line: index + 1,
                    source,
                })?;
            journal.users.insert(IdentityHash::of_user(&user), user);
        } else if let Some(kind) = EventKind::from_marker(first) {
            match Event::parse_entry(kind, &line[1..], &journal.users, registry) {
                Ok(event) => journal.events.push(event),
                Err(error) => {
                    warn!(line = index + 1, %error, "skipping malformed journal event line");
                }
            }
        }
        // Other first bytes are not journal records and are ignored.
    }
    Ok(journal)
}
