//! Command implementations.

pub mod contacts;
pub mod show_person;
pub mod users;
