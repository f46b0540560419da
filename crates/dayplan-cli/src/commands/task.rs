//! Task management commands for CLI.

use clap::Subcommand;
use dayplan_core::{NewTask, TaskCategory, TaskId, TaskPatch, TaskStatus, TaskStore};

use super::{day_or_today, print_json, time_on, CliResult, Workspace};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Day the times refer to (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Start time (HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// End time (HH:MM); defaults to one hour after start
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Category: buy, appointment, go, study
        #[arg(long)]
        category: Option<String>,
        /// Pick the category from the title's keywords
        #[arg(long, conflicts_with = "category")]
        auto_category: bool,
    },
    /// List tasks
    List {
        /// Only tasks starting on this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: i64,
    },
    /// Update a task
    Update {
        /// Task ID
        id: i64,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Day for --start/--end (default: the task's current day, else today)
        #[arg(long)]
        date: Option<String>,
        /// New start time (HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// New end time (HH:MM)
        #[arg(long)]
        end: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// New status: inprogress or done
        #[arg(long)]
        status: Option<String>,
    },
    /// Mark a task done
    Done {
        /// Task ID
        id: i64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: i64,
    },
}

fn parse_category(value: &str) -> Result<TaskCategory, String> {
    TaskCategory::parse(value)
        .ok_or_else(|| format!("unknown category '{value}' (expected buy, appointment, go or study)"))
}

pub async fn run(action: TaskAction, user: Option<&str>) -> CliResult {
    let ws = Workspace::open(user)?;
    let store: &dyn TaskStore = &ws.store;

    match action {
        TaskAction::Add {
            title,
            date,
            start,
            end,
            due,
            category,
            auto_category,
        } => {
            let day = day_or_today(date.as_deref())?;
            let mut task = NewTask::new(title);
            if let Some(start) = start {
                let end = end.map(|e| time_on(day, &e)).transpose()?;
                task = task.with_times(time_on(day, &start)?, end);
            }
            if let Some(due) = due {
                task.due_at = Some(dayplan_core::task::day_start(day_or_today(Some(&due))?));
            }
            task.category = match category {
                Some(c) => Some(parse_category(&c)?),
                None if auto_category => ws.config.categories.classify(&task.title),
                None => None,
            };

            let created = store.create(&ws.identity, task).await?;
            println!("Task created: {}", created.id);
            print_json(&created)?;
        }
        TaskAction::List { date, json } => {
            let tasks = match date {
                Some(slug) => {
                    let day = day_or_today(Some(&slug))?;
                    store.list_for_day(&ws.identity, day).await?
                }
                None => store.list_all(&ws.identity).await?,
            };

            if json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    let when = match (task.start_at, task.end_at) {
                        (Some(s), Some(e)) => format!("{} {}-{}", s.format("%Y-%m-%d"), s.format("%H:%M"), e.format("%H:%M")),
                        (Some(s), None) => format!("{} {}", s.format("%Y-%m-%d"), s.format("%H:%M")),
                        _ => "unscheduled".to_string(),
                    };
                    let mark = if task.status == TaskStatus::Done { "x" } else { " " };
                    let category = task.category.map(|c| c.as_str()).unwrap_or("-");
                    println!("[{mark}] {:>4}  {:<28} {:<12} {}", task.id, when, category, task.title);
                }
            }
        }
        TaskAction::Get { id } => {
            let task = store.get(&ws.identity, TaskId(id)).await?;
            print_json(&task)?;
        }
        TaskAction::Update {
            id,
            title,
            date,
            start,
            end,
            category,
            status,
        } => {
            let id = TaskId(id);
            let day = match date {
                Some(slug) => day_or_today(Some(&slug))?,
                None => {
                    let current = store.get(&ws.identity, id).await?;
                    current
                        .start_at
                        .map(|s| s.date_naive())
                        .map_or_else(|| day_or_today(None), Ok)?
                }
            };
            let patch = TaskPatch {
                title,
                start_at: start.map(|s| time_on(day, &s)).transpose()?,
                end_at: end.map(|e| time_on(day, &e)).transpose()?,
                status: status
                    .map(|s| TaskStatus::parse(&s).ok_or_else(|| format!("unknown status '{s}'")))
                    .transpose()?,
                category: category.map(|c| parse_category(&c)).transpose()?,
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }

            let updated = store.update(&ws.identity, id, patch).await?;
            println!("Task updated: {}", updated.id);
            print_json(&updated)?;
        }
        TaskAction::Done { id } => {
            let task = store.complete(&ws.identity, TaskId(id)).await?;
            println!("Task completed: {}", task.id);
        }
        TaskAction::Delete { id } => {
            store.delete(&ws.identity, TaskId(id)).await?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
