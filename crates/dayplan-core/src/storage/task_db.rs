//! SQLite-based task storage.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::data_dir;
use super::migrations;
use super::task_store::TaskStore;
use crate::error::{CoreError, DatabaseError, Result};
use crate::identity::Identity;
use crate::task::{day_start, NewTask, Task, TaskCategory, TaskId, TaskPatch, TaskStatus};

const TASK_COLUMNS: &str =
    "id, user_id, title, start_at, end_at, due_at, status, category, created_at";

/// RFC 3339 with a fixed `Z` suffix so stored values sort as text.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_optional_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| parse_timestamp(idx, &s))
        .transpose()
}

/// Build a Task from a database row selected with [`TASK_COLUMNS`].
fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status: String = row.get(6)?;
    let category: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Task {
        id: TaskId(row.get(0)?),
        user_id: row.get(1)?,
        title: row.get(2)?,
        start_at: parse_optional_timestamp(row, 3)?,
        end_at: parse_optional_timestamp(row, 4)?,
        due_at: parse_optional_timestamp(row, 5)?,
        status: TaskStatus::parse(&status).unwrap_or_default(),
        category: category.as_deref().and_then(TaskCategory::parse),
        created_at: parse_timestamp(8, &created_at)?,
    })
}

/// SQLite database for task storage.
///
/// One connection behind a mutex; calls are short and run on the caller's
/// thread.
pub struct TaskDb {
    conn: Mutex<Connection>,
}

impl TaskDb {
    /// Open the task database at `~/.config/dayplan/dayplan.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("dayplan.db");
        Self::open_at(&path)
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DatabaseError::QueryFailed("connection mutex poisoned".into()).into())
    }

    /// Fails unless `id` exists and belongs to `user`.
    fn check_owner(conn: &Connection, user: &Identity, id: TaskId) -> Result<()> {
        let owner: Option<String> = conn
            .query_row("SELECT user_id FROM tasks WHERE id = ?1", params![id.0], |row| {
                row.get(0)
            })
            .optional()?;
        match owner {
            None => Err(CoreError::NotFound { task_id: id }),
            Some(owner) if owner != user.user_id() => Err(CoreError::Unauthorized { task_id: id }),
            Some(_) => Ok(()),
        }
    }

    fn select_task(conn: &Connection, id: TaskId) -> Result<Task> {
        conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id.0],
            row_to_task,
        )
        .optional()?
        .ok_or(CoreError::NotFound { task_id: id })
    }

    pub fn get_task(&self, user: &Identity, id: TaskId) -> Result<Task> {
        let conn = self.conn()?;
        Self::check_owner(&conn, user, id)?;
        Self::select_task(&conn, id)
    }

    pub fn list_tasks(&self, user: &Identity) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY created_at, id"
        ))?;
        let tasks = stmt
            .query_map(params![user.user_id()], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Tasks starting within `[date 00:00, date+1 00:00)` UTC.
    pub fn list_tasks_for_day(&self, user: &Identity, date: NaiveDate) -> Result<Vec<Task>> {
        let from = day_start(date);
        let until = from + Duration::days(1);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND start_at >= ?2 AND start_at < ?3
             ORDER BY start_at, id"
        ))?;
        let tasks = stmt
            .query_map(
                params![user.user_id(), format_timestamp(from), format_timestamp(until)],
                row_to_task,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    pub fn create_task(&self, user: &Identity, task: &NewTask) -> Result<Task> {
        task.validate()?;
        let now = format_timestamp(Utc::now());
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (user_id, title, start_at, end_at, due_at, status, category, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                user.user_id(),
                task.title.trim(),
                task.start_at.map(format_timestamp),
                task.end_at.map(format_timestamp),
                task.due_at.map(format_timestamp),
                TaskStatus::InProgress.as_str(),
                task.category.map(|c| c.as_str()),
                now,
            ],
        )?;
        let id = TaskId(conn.last_insert_rowid());
        Self::select_task(&conn, id)
    }

    pub fn update_task(&self, user: &Identity, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let conn = self.conn()?;
        Self::check_owner(&conn, user, id)?;
        let current = Self::select_task(&conn, id)?;
        patch.validate_against(&current)?;
        let next = current.patched(patch);

        conn.execute(
            "UPDATE tasks
             SET title = ?2, start_at = ?3, end_at = ?4, status = ?5, category = ?6, updated_at = ?7
             WHERE id = ?1 AND user_id = ?8",
            params![
                id.0,
                next.title.trim(),
                next.start_at.map(format_timestamp),
                next.end_at.map(format_timestamp),
                next.status.as_str(),
                next.category.map(|c| c.as_str()),
                format_timestamp(Utc::now()),
                user.user_id(),
            ],
        )?;
        Self::select_task(&conn, id)
    }

    pub fn delete_task(&self, user: &Identity, id: TaskId) -> Result<()> {
        let conn = self.conn()?;
        Self::check_owner(&conn, user, id)?;
        conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![id.0, user.user_id()],
        )?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for TaskDb {
    async fn list_all(&self, user: &Identity) -> Result<Vec<Task>> {
        self.list_tasks(user)
    }

    async fn list_for_day(&self, user: &Identity, date: NaiveDate) -> Result<Vec<Task>> {
        self.list_tasks_for_day(user, date)
    }

    async fn get(&self, user: &Identity, id: TaskId) -> Result<Task> {
        self.get_task(user, id)
    }

    async fn create(&self, user: &Identity, task: NewTask) -> Result<Task> {
        self.create_task(user, &task)
    }

    async fn update(&self, user: &Identity, id: TaskId, patch: TaskPatch) -> Result<Task> {
        self.update_task(user, id, &patch)
    }

    async fn delete(&self, user: &Identity, id: TaskId) -> Result<()> {
        self.delete_task(user, id)
    }
}
