//! `stay` CLI — availability checks, night counts and bookings over a JSON
//! reservation snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Is apt-7 free from Jan 12 to Jan 14? (snapshot on stdin)
//! cat reservations.json | stay check --property apt-7 --start 2024-01-12 --end 2024-01-14
//!
//! # Same, from a file, evaluated as of a fixed instant
//! stay check -r reservations.json --property apt-7 --start 2024-01-12 --end 2024-01-14 \
//!     --now 2024-01-01T00:00:00Z
//!
//! # Nights and price for a stay
//! stay nights --start 2024-01-10 --end 2024-01-13 --rate 4500
//!
//! # Record a pending booking and write the updated snapshot
//! stay book -r reservations.json -o reservations.json --property apt-7 --user u-1 \
//!     --start 2024-02-01 --end 2024-02-04 --phone "+254 712 345 678"
//! ```

mod config;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use stay_engine::{
    parse_instant, parse_reservations, quote, submit_booking, AvailabilityChecker, BookingRequest,
    CandidateRange, FixedClock, InMemoryReservations, OverlapPolicy,
};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "stay",
    version,
    about = "Booking availability checks over reservation snapshots"
)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, env = "STAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Inclusive,
    HalfOpen,
}

impl From<PolicyArg> for OverlapPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Inclusive => OverlapPolicy::Inclusive,
            PolicyArg::HalfOpen => OverlapPolicy::HalfOpen,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a property is free for a date range
    Check {
        /// Reservation snapshot (JSON array; reads from stdin if omitted)
        #[arg(short, long)]
        reservations: Option<String>,
        #[arg(long)]
        property: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Evaluate as of this instant instead of the current time
        #[arg(long)]
        now: Option<String>,
        /// Override the configured boundary handling
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },
    /// Count nights between two dates, optionally pricing them
    Nights {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Nightly rate in minor currency units; prints a quote when given
        #[arg(long)]
        rate: Option<u64>,
    },
    /// Record a pending booking if the dates are free
    Book {
        /// Reservation snapshot (JSON array; reads from stdin if omitted)
        #[arg(short, long)]
        reservations: Option<String>,
        /// Write the updated snapshot here
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        property: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        now: Option<String>,
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging.level);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Check {
            reservations,
            property,
            start,
            end,
            now,
            policy,
        } => {
            let snapshot = parse_reservations(&read_input(reservations.as_deref())?)
                .context("Failed to parse reservations")?;
            let checker = build_checker(&config, now.as_deref(), policy)?;
            let result = checker
                .check(&property, date_arg("start", &start)?, date_arg("end", &end)?, &snapshot)
                .context("Availability check failed")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Nights { start, end, rate } => {
            let start = date_arg("start", &start)?;
            let end = date_arg("end", &end)?;
            match rate {
                None => println!("{}", stay_engine::nights(start, end)),
                Some(rate) => {
                    let q = quote(&CandidateRange::new(start, end), rate);
                    println!("{}", serde_json::to_string_pretty(&q)?);
                }
            }
        }
        Commands::Book {
            reservations,
            output,
            property,
            user,
            start,
            end,
            phone,
            now,
            policy,
        } => {
            let snapshot = parse_reservations(&read_input(reservations.as_deref())?)
                .context("Failed to parse reservations")?;
            let store = InMemoryReservations::from_snapshot(snapshot)
                .context("Invalid reservation snapshot")?;
            let checker = build_checker(&config, now.as_deref(), policy)?;
            let request = BookingRequest {
                property_id: property,
                user_id: user,
                start: date_arg("start", &start)?,
                end: date_arg("end", &end)?,
                phone,
            };

            let booked = submit_booking(&store, &checker, &request).context("Booking failed")?;
            println!("{}", serde_json::to_string_pretty(&booked)?);

            if let Some(path) = output {
                let updated = serde_json::to_string_pretty(&store.all())?;
                std::fs::write(&path, updated)
                    .with_context(|| format!("Failed to write file: {}", path))?;
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so stdout stays
/// parseable.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_checker(
    config: &AppConfig,
    now: Option<&str>,
    policy: Option<PolicyArg>,
) -> Result<AvailabilityChecker<FixedClock>> {
    let now: DateTime<Utc> = match now {
        Some(raw) => date_arg("now", raw)?,
        None => Utc::now(),
    };
    let policy = policy.map(OverlapPolicy::from).unwrap_or(config.checker.overlap);
    Ok(AvailabilityChecker::with_clock(FixedClock(now)).policy(policy))
}

fn date_arg(name: &str, raw: &str) -> Result<DateTime<Utc>> {
    parse_instant(raw).with_context(|| format!("Invalid --{}", name))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
