//! Journal writer implementation.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, NaiveDate, Utc};
use doorlog_core::{Event, EventKind, IdentityHash, Location, LocationRegistry, User};
use tracing::{debug, warn};

use crate::errors::{InitError, ReadError, RotationError, UnknownIdentity, WriteError};

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Unix permission bits applied when creating journal files
    /// (default: `0o644`). Ignored on non-Unix platforms.
    pub file_mode: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { file_mode: 0o644 }
    }
}

/// Computes the journal file path for a calendar date.
///
/// The name is the zero-padded `YYYYMMDD` date plus the `.txt` extension,
/// joined under the directory, so names sort chronologically.
pub fn journal_path_for(directory: impl AsRef<Path>, date: NaiveDate) -> PathBuf {
    directory
        .as_ref()
        .join(format!("{}.txt", date.format("%Y%m%d")))
}

/// Computes today's journal file path under the given directory.
pub fn current_journal_path(directory: impl AsRef<Path>) -> PathBuf {
    journal_path_for(directory, Local::now().date_naive())
}

/// Mutable writer state. The handle and the index live behind one lock so
/// every write observes both consistently.
struct WriterState {
    /// Current output file. `None` after [`JournalWriter::close`] or while a
    /// failed rotation has not been retried.
    output: Option<File>,
    /// Current location per known identity. `None` means registered but not
    /// checked in anywhere.
    known_users: HashMap<IdentityHash, Option<Location>>,
}

/// Write side of the journal.
///
/// The writer exclusively owns the output handle for the current date file
/// and the in-memory "current location per identity" index. All mutating
/// operations hold the write lock for the full validate / append / index
/// update sequence, so concurrent callers never observe a torn line or a
/// stale index entry; [`current_location`](Self::current_location) takes
/// only the read lock.
///
/// Every mutating operation performs synchronous file I/O while holding the
/// lock and may block; latency-sensitive callers need their own timeout or
/// backpressure policy in front of the writer.
///
/// # Example
///
/// ```rust
/// use doorlog_core::{EventKind, Location, LocationRegistry, User};
/// use doorlog_journal::JournalWriter;
///
/// let registry: LocationRegistry =
///     [Location::new("MOS", "Mosbach")].into_iter().collect();
/// let dir = tempfile::tempdir()?;
///
/// let writer = JournalWriter::new(dir.path(), &registry)?;
/// let user = User::new("Tester", "Teststadt");
/// writer.write_event_user(&user, registry.resolve("MOS").unwrap(), EventKind::Login)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalWriter {
    directory: PathBuf,
    options: WriterOptions,
    state: RwLock<WriterState>,
}

impl JournalWriter {
    /// Creates a writer storing journal files under `directory`.
    ///
    /// If a file for the current date already exists, its lines are replayed
    /// to recover the known-user index before the file is opened for
    /// appending. Missing directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if the existing file cannot be read or the
    /// output cannot be opened. Construction either fully succeeds or fails;
    /// there is no partially initialized writer.
    pub fn new(
        directory: impl Into<PathBuf>,
        registry: &LocationRegistry,
    ) -> Result<Self, InitError> {
        Self::with_options(directory, registry, WriterOptions::default())
    }

    /// Creates a writer with explicit [`WriterOptions`].
    pub fn with_options(
        directory: impl Into<PathBuf>,
        registry: &LocationRegistry,
        options: WriterOptions,
    ) -> Result<Self, InitError> {
        let directory = directory.into();
        let mut state = WriterState {
            output: None,
            known_users: HashMap::new(),
        };

        let file_path = current_journal_path(&directory);
        match std::fs::metadata(&file_path) {
            Ok(metadata) if metadata.is_file() => {
                recover_into(&mut state, &file_path, registry)?;
            }
            // A non-file in the way surfaces as an open failure below.
            Ok(_) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(InitError::Probe(error)),
        }

        open_output(&mut state, &directory, &options)?;

        Ok(Self {
            directory,
            options,
            state: RwLock::new(state),
        })
    }

    /// The directory journal files are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Today's output path for this writer's directory.
    pub fn current_path(&self) -> PathBuf {
        current_journal_path(&self.directory)
    }

    /// Registers a user in the journal if its identity is not yet known.
    ///
    /// Appends the `*` line and marks the identity as known with no current
    /// location. Repeat calls for the same identity write nothing and return
    /// the same hash.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the append fails; the identity is then not
    /// marked known, so a retry will write the line again.
    pub fn write_user_if_unknown(&self, user: &User) -> Result<IdentityHash, WriteError> {
        let hash = IdentityHash::of_user(user);
        let mut state = self.state_write();
        if !state.known_users.contains_key(&hash) {
            write_line(&mut state, &format!("*{}", user.to_journal_line()))?;
            state.known_users.insert(hash, None);
        }
        Ok(hash)
    }

    /// Appends an event for an already registered identity.
    ///
    /// The line carries the current wall-clock UTC unix timestamp. On
    /// success the index entry for the identity is set to the location for
    /// [`EventKind::Login`] and cleared for [`EventKind::Logout`],
    /// regardless of its previous value; the store does not police
    /// double-login, that policy belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::UnknownIdentity`] (before any bytes are
    /// written) if the hash was never registered, or [`WriteError`] on I/O
    /// failure.
    pub fn write_event_user_hash(
        &self,
        hash: &IdentityHash,
        location: &Location,
        kind: EventKind,
    ) -> Result<(), WriteError> {
        let mut state = self.state_write();
        if !state.known_users.contains_key(hash) {
            return Err(UnknownIdentity(hash.to_b64()).into());
        }
        let line = Event::format_line(kind, hash, location, Utc::now().timestamp());
        write_line(&mut state, &line)?;
        let entry = match kind {
            EventKind::Login => Some(location.clone()),
            EventKind::Logout => None,
        };
        state.known_users.insert(*hash, entry);
        Ok(())
    }

    /// Appends an event for a user, registering the user first if needed.
    ///
    /// The registration line is guaranteed to precede the event line in the
    /// file for this call. Two concurrent calls for different identities may
    /// interleave their lines; each line itself is written atomically.
    pub fn write_event_user(
        &self,
        user: &User,
        location: &Location,
        kind: EventKind,
    ) -> Result<(), WriteError> {
        let hash = self.write_user_if_unknown(user)?;
        self.write_event_user_hash(&hash, location, kind)
    }

    /// Returns where the identity is currently checked in, or `None` if it
    /// is registered but not checked in.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownIdentity`] if the hash was never registered.
    pub fn current_location(&self, hash: &IdentityHash) -> Result<Option<Location>, UnknownIdentity> {
        let state = self.state_read();
        match state.known_users.get(hash) {
            Some(entry) => Ok(entry.clone()),
            None => Err(UnknownIdentity(hash.to_b64())),
        }
    }

    /// Switches the output to the file for the current date.
    ///
    /// Closes the previous handle, creates missing directories, opens the
    /// current date file for appending and resets the known-user index:
    /// every daily file is self-contained, identities re-register on their
    /// first write of the day.
    ///
    /// # Errors
    ///
    /// Returns [`RotationError`] if the directory or file cannot be created.
    /// The old handle is already closed at that point; writes fail with
    /// [`WriteError::NotOpen`] until a retry succeeds.
    pub fn update_output(&self) -> Result<(), RotationError> {
        let mut state = self.state_write();
        open_output(&mut state, &self.directory, &self.options)?;
        state.known_users.clear();
        Ok(())
    }

    /// Closes the output handle. Subsequent writes fail with
    /// [`WriteError::NotOpen`] until [`update_output`](Self::update_output)
    /// reopens one.
    pub fn close(&self) {
        let mut state = self.state_write();
        state.output = None;
    }

    fn state_read(&self) -> RwLockReadGuard<'_, WriterState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, WriterState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Appends one newline-terminated line to the current output.
fn write_line(state: &mut WriterState, line: &str) -> Result<(), WriteError> {
    let Some(output) = state.output.as_mut() else {
        return Err(WriteError::NotOpen);
    };
    output.write_all(format!("{line}\n").as_bytes())?;
    Ok(())
}

/// Closes the previous handle and opens the current date file for append.
/// Does not touch the known-user index.
fn open_output(
    state: &mut WriterState,
    directory: &Path,
    options: &WriterOptions,
) -> Result<(), RotationError> {
    state.output = None;
    let file_path = current_journal_path(directory);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RotationError::CreateDirs {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut open_options = OpenOptions::new();
    open_options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open_options.mode(options.file_mode);
    }
    let file = open_options
        .open(&file_path)
        .map_err(|source| RotationError::Open {
            path: file_path.clone(),
            source,
        })?;
    state.output = Some(file);
    Ok(())
}

/// Replays an existing journal file into the known-user index.
///
/// Recovery rebuilds best-effort current state, not an audit trail: every
/// malformed line is logged and skipped, and event lines register their
/// identity even without a preceding `*` line. Only an unreadable file is
/// an error.
fn recover_into(
    state: &mut WriterState,
    path: &Path,
    registry: &LocationRegistry,
) -> Result<(), ReadError> {
    let file = File::open(path)?;
    debug!(path = %path.display(), "recovering journal state from existing file");

    for line in BufReader::new(file).lines() {
        let line = line?;
        let Some(&first) = line.as_bytes().first() else {
            continue;
        };
        let data = &line[1..];
        match first {
            b'*' => match User::parse_journal_line(data) {
                Ok(user) => {
                    state.known_users.insert(IdentityHash::of_user(&user), None);
                }
                Err(error) => warn!(%error, line = data, "failed to parse user line"),
            },
            b'+' => {
                let parts: Vec<&str> = data.splitn(3, '\t').collect();
                if parts.len() < 3 {
                    warn!(line = data, "failed to parse login line");
                    continue;
                }
                let hash = match IdentityHash::from_b64(parts[0]) {
                    Ok(hash) => hash,
                    Err(error) => {
                        warn!(%error, line = data, "failed to parse login line");
                        continue;
                    }
                };
                let Some(location) = registry.resolve(parts[1]) else {
                    warn!(code = parts[1], "failed to resolve location");
                    continue;
                };
                state.known_users.insert(hash, Some(location.clone()));
            }
            b'-' => {
                let hash_field = data.split('\t').next().unwrap_or(data);
                match IdentityHash::from_b64(hash_field) {
                    Ok(hash) => {
                        state.known_users.insert(hash, None);
                    }
                    Err(error) => warn!(%error, line = data, "failed to parse logout line"),
                }
            }
            _ => {}
        }
    }

    Ok(())
}
