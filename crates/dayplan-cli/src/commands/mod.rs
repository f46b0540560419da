//! Subcommands and the plumbing they share.

pub mod config;
pub mod day;
pub mod task;
pub mod week;

use chrono::{DateTime, NaiveDate, Utc};
use dayplan_core::task::{at_minute, parse_day};
use dayplan_core::{ClockTime, Config, Identity, TaskDb};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// What every store-backed command needs.
pub struct Workspace {
    pub config: Config,
    pub identity: Identity,
    pub store: TaskDb,
}

impl Workspace {
    pub fn open(user: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let identity = Identity::resolve(user, &config.identity)?;
        let store = TaskDb::open()?;
        tracing::debug!(user = %identity, "workspace opened");
        Ok(Self {
            config,
            identity,
            store,
        })
    }
}

/// `YYYY-MM-DD`, or today (UTC) when absent.
pub fn day_or_today(slug: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match slug {
        Some(slug) => Ok(parse_day(slug)?),
        None => Ok(Utc::now().date_naive()),
    }
}

/// `HH:MM` on `date`.
pub fn time_on(date: NaiveDate, time: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let clock: ClockTime = time.parse()?;
    Ok(at_minute(date, clock.minutes()))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
