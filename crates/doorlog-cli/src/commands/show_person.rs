//! Show-person command implementation.

use chrono::{Local, TimeZone};
use doorlog_core::{IdentityHash, LocationRegistry};
use doorlog_journal::read_journal;

use crate::output;

pub fn run(
    journal: &str,
    registry: &LocationRegistry,
    name: Option<&str>,
    address: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal = read_journal(journal, registry)
        .map_err(|e| format!("failed to read journal \"{journal}\": {e}"))?;
    let user = output::find_user(&journal, name, address)?;
    let hash = IdentityHash::of_user(user);

    // Print a location heading whenever the location changes, so a day
    // reads as blocks of "where they were".
    let mut last_location: Option<&str> = None;
    for event in journal.events() {
        if event.user != hash {
            continue;
        }
        if last_location != Some(event.location.code.as_str()) {
            println!("{}:", event.location.name);
            last_location = Some(event.location.code.as_str());
        }
        // Local time matters here; the raw timestamps are UTC.
        let Some(time) = Local.timestamp_opt(event.timestamp, 0).single() else {
            continue;
        };
        println!("{:>10}: {}", event.kind.name(), time.format("%H:%M:%S"));
    }
    Ok(())
}
