//! Week strip: the seven days around a date and how busy each one is.

use clap::Args;
use dayplan_core::{TaskStore, Week};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{day_or_today, print_json, CliResult, Workspace};

#[derive(Args)]
pub struct WeekArgs {
    /// Any day of the week to show (YYYY-MM-DD, default: today)
    #[arg(long)]
    date: Option<String>,
    /// Weeks to step forward (negative steps back)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i32,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DayCount {
    date: String,
    day_name: String,
    tasks: usize,
}

pub async fn run(args: WeekArgs, user: Option<&str>) -> CliResult {
    let ws = Workspace::open(user)?;

    let mut week = Week::containing(day_or_today(args.date.as_deref())?);
    for _ in 0..args.offset.unsigned_abs() {
        week = if args.offset < 0 { week.prev() } else { week.next() };
    }

    let mut per_day = BTreeMap::new();
    for task in ws.store.list_all(&ws.identity).await? {
        if let Some(start) = task.start_at.map(|s| s.date_naive()) {
            if week.contains(start) {
                *per_day.entry(start).or_insert(0usize) += 1;
            }
        }
    }

    let counts: Vec<DayCount> = week
        .days()
        .into_iter()
        .map(|day| DayCount {
            date: day.slug(),
            tasks: per_day.get(&day.date).copied().unwrap_or(0),
            day_name: day.day_name,
        })
        .collect();

    if args.json {
        return print_json(&counts);
    }

    println!("{}", week.header());
    for day in &counts {
        println!("{} {}  {:>2} task(s)", day.day_name, day.date, day.tasks);
    }
    Ok(())
}
