use thiserror::Error;

/// Errors that can occur while encoding or decoding journal records.
#[derive(Error, Debug)]
pub enum RecordError {
    /// User line did not split into exactly two tab-separated fields.
    #[error("user line should contain exactly two fields")]
    UserFieldCount,
    /// Event line did not contain the three expected fields.
    #[error("event data does not contain enough fields")]
    EventFieldCount,
    /// Identity hash was not valid base64 or had the wrong digest size.
    #[error("failed to decode user hash \"{value}\"")]
    InvalidHash {
        /// The hash field as it appeared on the line.
        value: String,
    },
    /// Identity hash does not resolve to a known user.
    #[error("couldn't resolve user hash \"{hash}\" in event data")]
    UnknownIdentity {
        /// Base64 form of the unresolved hash.
        hash: String,
    },
    /// Location code does not resolve to a registered location.
    #[error("couldn't resolve location code \"{code}\"")]
    UnknownLocation {
        /// The unresolved code.
        code: String,
    },
    /// Timestamp field was not a base-10 integer.
    #[error("failed to parse event timestamp \"{value}\": {source}")]
    InvalidTimestamp {
        /// The timestamp field as it appeared on the line.
        value: String,
        /// Underlying parse failure.
        source: std::num::ParseIntError,
    },
}
