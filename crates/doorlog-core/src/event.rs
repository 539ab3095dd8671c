use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::RecordError;
use crate::identity::IdentityHash;
use crate::location::{Location, LocationRegistry};
use crate::user::User;

/// Whether an event checks a user in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// User checked in at a location.
    Login,
    /// User checked out of a location.
    Logout,
}

impl EventKind {
    /// The line marker byte for this kind.
    pub fn marker(self) -> char {
        match self {
            EventKind::Login => '+',
            EventKind::Logout => '-',
        }
    }

    /// Maps a line marker byte back to its kind.
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(EventKind::Login),
            b'-' => Some(EventKind::Logout),
            _ => None,
        }
    }

    /// Human-readable name for display output.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Login => "Login",
            EventKind::Logout => "Logout",
        }
    }
}

/// A single check-in or check-out record.
///
/// Events are immutable once appended to a journal. The user is referenced
/// by identity hash; the owning journal resolves it back to a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Login or logout.
    pub kind: EventKind,
    /// Identity of the user the event concerns.
    pub user: IdentityHash,
    /// Where the event took place.
    pub location: Location,
    /// Wall-clock time of the write, unix seconds UTC.
    pub timestamp: i64,
}

impl Event {
    /// Formats the full journal line for an event, marker included.
    pub fn format_line(
        kind: EventKind,
        user: &IdentityHash,
        location: &Location,
        timestamp: i64,
    ) -> String {
        format!(
            "{}{}\t{}\t{}",
            kind.marker(),
            user.to_b64(),
            location.code,
            timestamp
        )
    }

    /// Parses the portion of an event line after the marker byte.
    ///
    /// `users` is the table of identities registered so far (events may only
    /// reference identities whose `*` line has already been consumed) and
    /// `registry` resolves location codes.
    ///
    /// # Errors
    ///
    /// - [`RecordError::EventFieldCount`] if the data does not split into
    ///   three tab-separated fields
    /// - [`RecordError::InvalidHash`] if the hash field is not decodable
    /// - [`RecordError::UnknownIdentity`] if the hash is not in `users`
    /// - [`RecordError::UnknownLocation`] if the code is not registered
    /// - [`RecordError::InvalidTimestamp`] if the timestamp is not a base-10
    ///   integer
    pub fn parse_entry(
        kind: EventKind,
        data: &str,
        users: &HashMap<IdentityHash, User>,
        registry: &LocationRegistry,
    ) -> Result<Self, RecordError> {
        let parts: Vec<&str> = data.splitn(3, '\t').collect();
        if parts.len() < 3 {
            return Err(RecordError::EventFieldCount);
        }
        let user = IdentityHash::from_b64(parts[0])?;
        if !users.contains_key(&user) {
            return Err(RecordError::UnknownIdentity {
                hash: parts[0].to_string(),
            });
        }
        let location = registry
            .resolve(parts[1])
            .ok_or_else(|| RecordError::UnknownLocation {
                code: parts[1].to_string(),
            })?
            .clone();
        let timestamp = parts[2]
            .parse::<i64>()
            .map_err(|source| RecordError::InvalidTimestamp {
                value: parts[2].to_string(),
                source,
            })?;
        Ok(Self {
            kind,
            user,
            location,
            timestamp,
        })
    }
}
