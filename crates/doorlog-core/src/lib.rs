//! Canonical presence records and identity hashing for doorlog journals.
//!
//! This crate provides:
//! - The `User`, `Location` and `Event` record types and their tab-separated
//!   journal line codec
//! - Content-derived identity hashing (`IdentityHash`) for users
//! - The injectable `LocationRegistry` used to resolve location codes
//!
//! Core invariants:
//! - An identity hash is derived solely from a user's canonical line, never
//!   from object identity
//! - Two users with the same (name, address) pair are the same identity
//! - Records are plain single-line text; decoding is a pure function over the
//!   line contents and the injected resolvers

#![deny(missing_docs)]

/// Error types for record encoding and decoding.
pub mod errors;
/// Event kinds, event records and the event line codec.
pub mod event;
/// Content-derived identity hashing.
pub mod identity;
/// Locations and the code-to-location registry.
pub mod location;
/// User records and the user line codec.
pub mod user;

pub use errors::RecordError;
pub use event::{Event, EventKind};
pub use identity::IdentityHash;
pub use location::{Location, LocationRegistry};
pub use user::User;
