use serde::{Deserialize, Serialize};

use crate::errors::RecordError;

/// A person who can check in and out of locations.
///
/// Identity is derived, not stored: two users with the same name and address
/// are the same identity. See [`IdentityHash`](crate::IdentityHash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Full name.
    pub name: String,
    /// Postal address.
    pub address: String,
}

impl User {
    /// Creates a user from name and address.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Converts the user to its canonical journal line.
    ///
    /// The line joins name and address with a tab; tabs embedded in either
    /// field are replaced with four spaces so the line always splits back
    /// into exactly two fields. This canonical form is also the hash input
    /// for [`IdentityHash::of_user`](crate::IdentityHash::of_user).
    pub fn to_journal_line(&self) -> String {
        format!(
            "{}\t{}",
            self.name.replace('\t', "    "),
            self.address.replace('\t', "    ")
        )
    }

    /// Parses the journal form of user data back into a [`User`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UserFieldCount`] if the line does not split
    /// into exactly two tab-separated fields.
    pub fn parse_journal_line(line: &str) -> Result<Self, RecordError> {
        let parts: Vec<&str> = line.splitn(3, '\t').collect();
        if parts.len() != 2 {
            return Err(RecordError::UserFieldCount);
        }
        Ok(Self {
            name: parts[0].to_string(),
            address: parts[1].to_string(),
        })
    }
}
