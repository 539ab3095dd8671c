//! Shared helpers for command implementations.

use doorlog_core::User;
use doorlog_journal::Journal;

/// Finds a user by case-insensitive substring filters on name and/or
/// address. At least one filter must be given; when several users match,
/// the first match wins. The "not found" error lists the known users so a
/// typo is easy to spot.
pub fn find_user<'a>(
    journal: &'a Journal,
    name: Option<&str>,
    address: Option<&str>,
) -> Result<&'a User, Box<dyn std::error::Error>> {
    if name.is_none() && address.is_none() {
        return Err("either a filter by name or by address must be specified".into());
    }
    let name = name.map(str::to_lowercase);
    let address = address.map(str::to_lowercase);

    let matched = journal.users().find(|user| {
        name.as_deref()
            .map_or(true, |n| user.name.to_lowercase().contains(n))
            && address
                .as_deref()
                .map_or(true, |a| user.address.to_lowercase().contains(a))
    });
    match matched {
        Some(user) => Ok(user),
        None => {
            let known: Vec<&str> = journal.users().map(|u| u.name.as_str()).collect();
            Err(format!(
                "could not find such a user, known users are: {}",
                known.join(", ")
            )
            .into())
        }
    }
}
