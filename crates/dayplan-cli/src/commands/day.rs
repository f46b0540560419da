//! Day timeline commands: render the layout, move or resize a card, and
//! ask the suggestion service for a new schedule.

use chrono::{Duration, NaiveDate, Utc};
use clap::Subcommand;
use dayplan_core::timeline::GridMark;
use dayplan_core::{
    hour_label, ClockTime, DayContext, DaySession, DayTask, HttpSuggestionSource, Identity,
    LayoutRecord, NowIndicator, PendingUpdate, ScheduleReconciler, Settlement, TaskId, TaskStore,
};
use serde::Serialize;
use url::Url;

use super::{day_or_today, print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum DayAction {
    /// Show the day's timeline layout
    Show {
        /// Day to show (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drag a task along its day
    Move {
        /// Task ID
        id: i64,
        /// Pointer travel in pixels (negative moves earlier)
        #[arg(long, allow_hyphen_values = true, conflicts_with = "to", required_unless_present = "to")]
        by: Option<f64>,
        /// New start time (HH:MM)
        #[arg(long)]
        to: Option<String>,
    },
    /// Drag a task's bottom edge
    Resize {
        /// Task ID
        id: i64,
        /// New end time (HH:MM)
        #[arg(long)]
        to: String,
    },
    /// Reschedule the day with the suggestion service
    Suggest {
        /// Day to reschedule (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Override suggestion.endpoint
        #[arg(long)]
        endpoint: Option<Url>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct HourRow {
    hour: u32,
    label: String,
    coord: f64,
}

#[derive(Serialize)]
struct NowLine {
    minute: i64,
    coord: f64,
}

#[derive(Serialize)]
struct DayView<'a> {
    date: NaiveDate,
    scroll: Option<f64>,
    now: Option<NowLine>,
    hours: Vec<HourRow>,
    grid: Vec<GridMark>,
    tasks: &'a [DayTask],
    layout: &'a [LayoutRecord],
}

pub async fn run(action: DayAction, user: Option<&str>) -> CliResult {
    let ws = Workspace::open(user)?;

    match action {
        DayAction::Show { date, json } => {
            let day = day_or_today(date.as_deref())?;
            let ctx = DayContext::from_config(ws.identity.clone(), day, &ws.config);
            let mut session = ctx.load(&ws.store).await?;

            let mut layout = session.layout();
            layout.sort_by(|a, b| a.top.total_cmp(&b.top));
            let scroll = session.initial_scroll();
            let now = now_line(&session, ws.config.timeline.now_refresh_secs);

            let scale = *session.scale();
            if json {
                let hours = scale
                    .hour_slots()
                    .map(|hour| HourRow {
                        hour,
                        label: hour_label(hour),
                        coord: scale.minutes_to_coord(i64::from(hour) * 60),
                    })
                    .collect();
                return print_json(&DayView {
                    date: day,
                    scroll,
                    now,
                    hours,
                    grid: scale.grid_marks(),
                    tasks: session.tasks(),
                    layout: &layout,
                });
            }

            println!("{}", day.format("%A, %B %-d, %Y"));
            if layout.is_empty() {
                println!("No tasks.");
                return Ok(());
            }

            let cards: Vec<(&LayoutRecord, &DayTask)> = layout
                .iter()
                .filter_map(|record| session.task(record.task_id).map(|task| (record, task)))
                .collect();
            let start_hour = |card: &(&LayoutRecord, &DayTask)| (card.1.start_minute / 60) as u32;

            for hour in scale.hour_slots() {
                let label = hour_label(hour);
                let in_hour: Vec<_> = cards.iter().filter(|card| start_hour(card) == hour).collect();
                if in_hour.is_empty() {
                    println!("{label:>5}");
                }
                for (i, (record, task)) in in_hour.into_iter().enumerate() {
                    let label = if i == 0 { label.as_str() } else { "" };
                    print_card(label, record, task);
                }
            }
            // Tasks that start before the visible range.
            let visible = |card: &&(&LayoutRecord, &DayTask)| scale.hour_slots().any(|h| h == start_hour(card));
            for card in cards.iter().filter(|card| !visible(card)) {
                print_card(&hour_label(start_hour(card)), card.0, card.1);
            }

            if let Some(now) = now {
                println!(
                    "now   {} at {:.0}px",
                    ClockTime::from_minutes(now.minute),
                    now.coord
                );
            }
        }
        DayAction::Move { id, by, to } => {
            let id = TaskId(id);
            let mut session = open_for_task(&ws, id).await?;
            let delta = match (by, to) {
                (Some(delta), _) => delta,
                (None, Some(time)) => {
                    let target: ClockTime = time.parse()?;
                    let current = session.task(id).ok_or("task is not on the timeline")?;
                    (target.minutes() - current.start_minute) as f64 * session.scale().px_per_minute
                }
                (None, None) => return Err("either --by or --to is required".into()),
            };

            let pending = session.move_task(id, delta)?;
            persist(&mut session, pending, &ws.store, &ws.identity).await?;
            report_task(&session, id);
        }
        DayAction::Resize { id, to } => {
            let id = TaskId(id);
            let target: ClockTime = to.parse()?;
            let mut session = open_for_task(&ws, id).await?;

            let end_coord = session.scale().minutes_to_coord(target.minutes());
            let pending = session.resize_task(id, end_coord)?;
            persist(&mut session, pending, &ws.store, &ws.identity).await?;
            report_task(&session, id);
        }
        DayAction::Suggest {
            date,
            endpoint,
            json,
        } => {
            let day = day_or_today(date.as_deref())?;
            let mut settings = ws.config.suggestion.clone();
            if let Some(endpoint) = endpoint {
                settings.endpoint = Some(endpoint.to_string());
            }
            let source = HttpSuggestionSource::from_config(&settings)?;

            let tasks = ws.store.list_for_day(&ws.identity, day).await?;
            if tasks.is_empty() {
                println!("No tasks on {day}.");
                return Ok(());
            }

            let report = ScheduleReconciler::from_config(&source, &ws.store, &ws.config)
                .reconcile(&ws.identity, &tasks)
                .await?;

            if json {
                return print_json(&report);
            }

            for task in &report.updated {
                let when = match (task.start_at, task.end_at) {
                    (Some(s), Some(e)) => format!("{}-{}", s.format("%H:%M"), e.format("%H:%M")),
                    (Some(s), None) => s.format("%H:%M").to_string(),
                    _ => "unscheduled".to_string(),
                };
                println!("Rescheduled {:>4}  {when:<11} {}", task.id, task.title);
            }
            for failure in &report.failed {
                println!("Failed      {:>4}  {}", failure.task_id, failure.error);
            }
            for violation in &report.violations {
                println!("Warning: {violation}");
            }
        }
    }
    Ok(())
}

/// Opens the day the task currently starts on.
async fn open_for_task(ws: &Workspace, id: TaskId) -> Result<DaySession, Box<dyn std::error::Error>> {
    let task = ws.store.get(&ws.identity, id).await?;
    let start = task.start_at.ok_or("task has no start time")?;
    let ctx = DayContext::from_config(ws.identity.clone(), start.date_naive(), &ws.config);
    Ok(ctx.load(&ws.store).await?)
}

/// Sends an update and settles it, retrying once if the store was
/// unreachable.
async fn persist(
    session: &mut DaySession,
    pending: PendingUpdate,
    store: &dyn TaskStore,
    user: &Identity,
) -> CliResult {
    let task_id = pending.task_id;
    let mut pending = pending;
    let mut retried = false;
    loop {
        let outcome = pending.send(store, user).await;
        match session.apply_outcome(outcome) {
            Settlement::Confirmed | Settlement::Stale => return Ok(()),
            Settlement::RolledBack(err) => return Err(err.into()),
            Settlement::RetryPending(err) => {
                if retried {
                    return Err(err.into());
                }
                retried = true;
                pending = session.retry(task_id).ok_or(err)?;
            }
        }
    }
}

fn report_task(session: &DaySession, id: TaskId) {
    if let Some(task) = session.task(id) {
        println!("Task {}: {}-{} {}", task.id, task.start_time(), task.end_time(), task.title);
    } else {
        println!("Task {id} moved off {}", session.date());
    }
}

fn print_card(label: &str, record: &LayoutRecord, task: &DayTask) {
    println!(
        "{:>5}  {}-{}  col {}/{} {:>3}%  [{}] {}",
        label,
        task.start_time(),
        task.end_time(),
        record.column.index + 1,
        record.column.size,
        record.width_percent,
        task.id,
        task.title,
    );
}

/// Only drawn when the day shown is today.
fn now_line(session: &DaySession, refresh_secs: u64) -> Option<NowLine> {
    let now = Utc::now();
    if now.date_naive() != session.date() {
        return None;
    }
    let every = Duration::seconds(refresh_secs.min(86_400) as i64);
    let mut indicator = NowIndicator::new(*session.scale(), every);
    indicator.tick(&now);
    Some(NowLine {
        minute: indicator.minute_of_day()?,
        coord: indicator.coord()?,
    })
}
