//! Users command implementation.

use doorlog_core::{IdentityHash, LocationRegistry};
use doorlog_journal::read_journal;
use serde_json::json;

pub fn run(
    journal: &str,
    registry: &LocationRegistry,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let journal = read_journal(journal, registry)
        .map_err(|e| format!("failed to read journal \"{journal}\": {e}"))?;

    for user in journal.users() {
        let hash = IdentityHash::of_user(user);
        if json {
            println!(
                "{}",
                serde_json::to_string(&json!({
                    "hash": hash.to_b64(),
                    "name": user.name,
                    "address": user.address,
                }))?
            );
        } else {
            println!("{}\t{}\t{}", hash, user.name, user.address);
        }
    }
    Ok(())
}
