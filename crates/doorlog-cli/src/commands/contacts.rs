//! Contacts command implementation.
//!
//! Walks the event sequence once, tracking who is checked in where, and
//! reports every identity whose presence overlapped the selected person's
//! at the same location, with the overlap duration.

use std::collections::HashMap;

use doorlog_core::{Event, EventKind, IdentityHash, Location, LocationRegistry};
use doorlog_journal::{read_journal, Journal};

use crate::output;

pub fn run(
    journal: &str,
    registry: &LocationRegistry,
    name: Option<&str>,
    address: Option<&str>,
    csv: bool,
    csv_headers: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal = read_journal(journal, registry)
        .map_err(|e| format!("failed to read journal \"{journal}\": {e}"))?;
    let user = output::find_user(&journal, name, address)?;
    let hash = IdentityHash::of_user(user);

    if csv {
        if csv_headers {
            println!("Duration in seconds,Location,Contact Name,Contact Address");
        }
    } else {
        println!("Showing contacts for user {} ({}):", user.name, user.address);
    }

    // Per location code: everyone currently checked in, with their login
    // event for the overlap start.
    let mut present: HashMap<&str, HashMap<IdentityHash, &Event>> = HashMap::new();
    let mut user_login: Option<&Event> = None;
    let mut last_heading: Option<String> = None;

    for event in journal.events() {
        if event.user == hash {
            match event.kind {
                EventKind::Login => user_login = Some(event),
                EventKind::Logout => {
                    // The person leaves: everyone still present at the
                    // location was a contact.
                    let Some(login) = user_login.take() else {
                        continue;
                    };
                    if let Some(others) = present.get(login.location.code.as_str()) {
                        for (other, other_login) in others {
                            print_contact(
                                &journal,
                                *other,
                                &login.location,
                                login.timestamp.max(other_login.timestamp),
                                event.timestamp,
                                csv,
                                &mut last_heading,
                            );
                        }
                    }
                }
            }
        } else {
            match event.kind {
                EventKind::Login => {
                    present
                        .entry(event.location.code.as_str())
                        .or_default()
                        .insert(event.user, event);
                }
                EventKind::Logout => {
                    // A contact leaves while the person is still there.
                    if let Some(login) = user_login {
                        if event.location.code == login.location.code {
                            if let Some(other_login) = present
                                .get(event.location.code.as_str())
                                .and_then(|at| at.get(&event.user))
                            {
                                print_contact(
                                    &journal,
                                    event.user,
                                    &event.location,
                                    login.timestamp.max(other_login.timestamp),
                                    event.timestamp,
                                    csv,
                                    &mut last_heading,
                                );
                            }
                        }
                    }
                    if let Some(at) = present.get_mut(event.location.code.as_str()) {
                        at.remove(&event.user);
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_contact(
    journal: &Journal,
    other: IdentityHash,
    location: &Location,
    start: i64,
    end: i64,
    csv: bool,
    last_heading: &mut Option<String>,
) {
    let Some(user) = journal.user(&other) else {
        return;
    };
    let secs = (end - start).max(0);

    if csv {
        println!(
            "{},{},\"{}\",\"{}\"",
            secs, location.name, user.name, user.address
        );
    } else {
        if last_heading.as_deref() != Some(location.code.as_str()) {
            println!("{}:", location.name);
            *last_heading = Some(location.code.clone());
        }
        println!(
            "  {:2}h {:2}m {:2}s - {} - {}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60,
            user.name,
            user.address
        );
    }
}
