use std::io;
use std::path::PathBuf;

use doorlog_core::RecordError;
use thiserror::Error;

/// Errors that can occur while reading a journal file.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The path does not point at a regular file.
    #[error("\"{0}\" is not a regular file")]
    NotAFile(PathBuf),
    /// I/O error while opening or reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A user line failed to parse. Every later event depends on identity
    /// resolution, so this aborts the parse.
    #[error("failed to read journal user line {line}: {source}")]
    UserLine {
        /// 1-based line number of the bad line.
        line: usize,
        /// The underlying codec failure.
        source: RecordError,
    },
}

/// The identity hash was never registered with the writer.
#[derive(Error, Debug)]
#[error("unknown user hash \"{0}\"")]
pub struct UnknownIdentity(pub String);

/// Errors that can occur while appending to the journal.
#[derive(Error, Debug)]
pub enum WriteError {
    /// I/O failure during the append; the line must be assumed lost.
    #[error("failed to write journal line: {0}")]
    Io(#[from] io::Error),
    /// The writer currently has no output handle (closed, or a failed
    /// rotation has not been retried yet).
    #[error("journal writer has no open output")]
    NotOpen,
    /// Event writes require a previously registered identity.
    #[error(transparent)]
    UnknownIdentity(#[from] UnknownIdentity),
}

/// Errors that can occur while constructing a
/// [`JournalWriter`](crate::JournalWriter).
#[derive(Error, Debug)]
pub enum InitError {
    /// Could not check whether a current-date file already exists.
    #[error("failed trying to check for existing journal data: {0}")]
    Probe(#[source] io::Error),
    /// The existing current-date file could not be replayed.
    #[error("failed to recover existing journal data: {0}")]
    Recovery(#[from] ReadError),
    /// Opening the output file failed.
    #[error("failed to create new journal writer: {0}")]
    Open(#[from] RotationError),
}

/// Errors that can occur while switching the output to a new date file.
#[derive(Error, Debug)]
pub enum RotationError {
    /// Creating the journal directory failed.
    #[error("failed to create directories for journal \"{path}\": {source}")]
    CreateDirs {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },
    /// Opening the new output file failed.
    #[error("failed to open journal file \"{path}\": {source}")]
    Open {
        /// The file that could not be opened.
        path: PathBuf,
        /// The underlying I/O failure.
        source: io::Error,
    },
}
