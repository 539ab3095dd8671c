//! Append-only journal store for presence events.
//!
//! This crate provides:
//! - [`JournalWriter`] - concurrency-safe append writer with an in-memory
//!   "current location per identity" index and crash recovery at startup
//! - [`read_journal`] - one-shot full parse of a journal file into an
//!   immutable [`Journal`]
//! - [`spawn_rotation`] - background task that switches the writer to a new
//!   date-keyed file at local midnight
//!
//! ## Quick Start
//!
//! ```rust
//! use doorlog_core::{EventKind, IdentityHash, Location, LocationRegistry, User};
//! use doorlog_journal::{read_journal, JournalWriter};
//!
//! let registry: LocationRegistry =
//!     [Location::new("MOS", "Mosbach")].into_iter().collect();
//! let dir = tempfile::tempdir()?;
//!
//! // Record a check-in.
//! let writer = JournalWriter::new(dir.path(), &registry)?;
//! let mosbach = registry.resolve("MOS").unwrap();
//! let user = User::new("Tester", "Teststadt");
//! writer.write_event_user(&user, mosbach, EventKind::Login)?;
//!
//! let hash = IdentityHash::of_user(&user);
//! assert_eq!(writer.current_location(&hash)?.unwrap().code, "MOS");
//!
//! // Read the full journal back.
//! let journal = read_journal(writer.current_path(), &registry)?;
//! assert_eq!(journal.events().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## File format
//!
//! One file per calendar date at `<directory>/<YYYYMMDD>.txt`, one record
//! per newline-terminated line:
//!
//! ```text
//! *<name>\t<address>
//! +<base64-identity-hash>\t<location-code>\t<unix-seconds>
//! -<base64-identity-hash>\t<location-code>\t<unix-seconds>
//! ```
//!
//! A `*` line registers an identity and always precedes event lines for
//! that identity within a file. Files are append-only; rotation opens a new
//! file and never rewrites the old one.

#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// Full-file journal parsing.
pub mod reader;
/// Daily rotation scheduling.
pub mod rotation;
/// Journal writer implementation.
pub mod writer;

pub use errors::{InitError, ReadError, RotationError, UnknownIdentity, WriteError};
pub use reader::{read_journal, Journal};
pub use rotation::{spawn_rotation, RotationHandle};
pub use writer::{current_journal_path, journal_path_for, JournalWriter, WriterOptions};
