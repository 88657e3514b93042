//! `slots` CLI — compute a teacher's free slots from an availability snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Free slots for teacher 42 in their own zone (snapshot on stdin)
//! slots query --teacher 42 --start 2026-03-16 --end 2026-03-22 < snapshot.json
//!
//! # Same query shown in another zone, snapshot from file, pretty output
//! slots query --teacher 42 --start 2026-03-16 --end 2026-03-22 \
//!   --tz Europe/London -i snapshot.json --pretty
//!
//! # Tighter range cap and DST policy from a config file
//! slots --config slots.toml query --teacher 42 --start 2026-03-16 --end 2026-03-22
//!
//! # List the dates of a range with their weekday index (0 = Monday)
//! slots weekdays --start 2026-03-16 --end 2026-03-22
//! ```
//!
//! The snapshot is a JSON object with optional `teachers`, `rules`,
//! `exceptions` and `bookings` arrays. Input errors (bad range, unknown
//! teacher, bad zone, range too long) exit with status 2.

mod config;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use slot_engine::date_range::day_index;
use slot_engine::{
    AvailabilityService, DateRange, DstPolicy, InMemoryStore, SlotError, SlotQuery, TeacherId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;

/// Exit status for errors caused by the caller's input.
const EXIT_CLIENT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Compute bookable tutor slots from availability snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML settings file
    #[arg(long, global = true, env = "SLOTS_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of days a query may span
    #[arg(long, global = true, env = "SLOTS_MAX_DAYS")]
    max_days: Option<u64>,

    /// How to treat window boundaries inside a DST gap: skip | shift-forward
    #[arg(long, global = true)]
    dst_policy: Option<DstPolicy>,

    /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "SLOTS_LOG")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute free slots for one teacher over an inclusive date range
    Query {
        /// Teacher id
        #[arg(long)]
        teacher: i64,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Display zone (IANA id); defaults to the teacher's zone
        #[arg(long)]
        tz: Option<String>,
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON response
        #[arg(long)]
        pretty: bool,
    },
    /// Print every date in a range with its weekday
    Weekdays {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.max_days,
        cli.dst_policy,
        cli.log_level,
    );
    init_tracing(&settings.log_level);
    tracing::debug!(?settings, "loaded settings");

    match cli.command {
        Commands::Query {
            teacher,
            start,
            end,
            tz,
            input,
            output,
            pretty,
        } => {
            let snapshot = read_input(input.as_deref())?;
            let store =
                InMemoryStore::from_json(&snapshot).context("Failed to parse snapshot JSON")?;
            let service = AvailabilityService::new(store)
                .with_limits(settings.limits())
                .with_dst_policy(settings.dst_policy);
            let query = SlotQuery {
                teacher_id: TeacherId(teacher),
                start,
                end,
                tz,
            };

            let response = service.free_slots(&query).unwrap_or_else(|err| exit_with(err));
            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            write_output(output.as_deref(), &json)?;
        }
        Commands::Weekdays { start, end } => {
            if let Err(err) = print_weekdays(start, end, &settings) {
                exit_with(err);
            }
        }
    }

    Ok(())
}

/// Report an engine error on stderr and terminate. Engine errors all stem
/// from the caller's input.
fn exit_with(err: SlotError) -> ! {
    eprintln!("Error: {}", err);
    process::exit(EXIT_CLIENT_ERROR);
}

fn print_weekdays(
    start: NaiveDate,
    end: NaiveDate,
    settings: &Settings,
) -> std::result::Result<(), SlotError> {
    if end < start {
        return Err(SlotError::InvalidRange { start, end });
    }
    let days = DateRange::day_count(start, end);
    if days > settings.max_span_days {
        return Err(SlotError::RangeTooLong {
            days,
            max: settings.max_span_days,
        });
    }
    for (date, weekday) in DateRange::new(start, end) {
        println!("{} {} {}", date, weekday, day_index(weekday));
    }
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slot_engine={level},slots={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
