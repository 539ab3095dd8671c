use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};

use crate::errors::RecordError;
use crate::user::User;

/// Content-derived identifier for a [`User`].
///
/// The hash is the SHA-1 digest of the user's canonical journal line, so it
/// is deterministic for a given (name, address) pair and never depends on
/// object identity. On disk and in indexes the hash appears as standard
/// base64 text; in memory it is kept as the raw 20 digest bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityHash([u8; 20]);

impl IdentityHash {
    /// Digest size in bytes.
    pub const LEN: usize = 20;

    /// Computes the identity hash for a user.
    pub fn of_user(user: &User) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(user.to_journal_line().as_bytes());
        Self(hasher.finalize().into())
    }

    /// Decodes a hash from its base64 journal representation.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidHash`] if the value is not valid base64
    /// or does not decode to exactly [`Self::LEN`] bytes.
    pub fn from_b64(value: &str) -> Result<Self, RecordError> {
        let invalid = || RecordError::InvalidHash {
            value: value.to_string(),
        };
        let bytes = STANDARD.decode(value).map_err(|_| invalid())?;
        let bytes: [u8; Self::LEN] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }

    /// Encodes the hash as standard base64 text.
    pub fn to_b64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_b64())
    }
}

impl fmt::Debug for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityHash({})", self.to_b64())
    }
}

impl FromStr for IdentityHash {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_b64(s)
    }
}

impl Serialize for IdentityHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_b64())
    }
}

impl<'de> Deserialize<'de> for IdentityHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_b64(&value).map_err(serde::de::Error::custom)
    }
}
