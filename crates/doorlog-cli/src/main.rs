//! Doorlog CLI - analysis tools over presence journal files.

use clap::{Parser, Subcommand};
use doorlog_core::{Location, LocationRegistry};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{contacts, show_person, users};

#[derive(Parser)]
#[command(name = "doorlog")]
#[command(about = "Doorlog presence journal analysis CLI")]
struct Cli {
    /// Known locations as CODE=NAME pairs, e.g. --location MOS=Mosbach
    #[arg(
        long = "location",
        value_name = "CODE=NAME",
        value_parser = parse_location,
        global = true
    )]
    locations: Vec<Location>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List users registered in a journal
    Users {
        /// Path to journal file
        journal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one person's event timeline
    ShowPerson {
        /// Path to journal file
        journal: String,
        /// Filter by substring of the user's name
        #[arg(long)]
        name: Option<String>,
        /// Filter by substring of the user's address
        #[arg(long)]
        address: Option<String>,
    },
    /// List everyone who shared a location with a person, with overlap durations
    Contacts {
        /// Path to journal file
        journal: String,
        /// Filter by substring of the user's name
        #[arg(long)]
        name: Option<String>,
        /// Filter by substring of the user's address
        #[arg(long)]
        address: Option<String>,
        /// Output as CSV
        #[arg(long)]
        csv: bool,
        /// Include a CSV header row
        #[arg(long)]
        csv_headers: bool,
    },
}

fn parse_location(value: &str) -> Result<Location, String> {
    match value.split_once('=') {
        Some((code, name)) if !code.is_empty() && !name.is_empty() => {
            Ok(Location::new(code, name))
        }
        _ => Err(format!("expected CODE=NAME, got \"{value}\"")),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let registry: LocationRegistry = cli.locations.into_iter().collect();

    let result = match cli.command {
        Commands::Users { journal, json } => users::run(&journal, &registry, json),
        Commands::ShowPerson {
            journal,
            name,
            address,
        } => show_person::run(&journal, &registry, name.as_deref(), address.as_deref()),
        Commands::Contacts {
            journal,
            name,
            address,
            csv,
            csv_headers,
        } => contacts::run(
            &journal,
            &registry,
            name.as_deref(),
            address.as_deref(),
            csv,
            csv_headers,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
