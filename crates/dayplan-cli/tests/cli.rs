//! End-to-end tests that drive the `dayplan` binary against a scratch
//! data directory.

use serde_json::Value;
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_dayplan"));
        cmd.env("DAYPLAN_DATA_DIR", self.dir.path())
            .env("DAYPLAN_USER", "alice")
            .env_remove("DAYPLAN_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    /// Runs `args`, asserts success, and returns stdout.
    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn json(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.ok(args)).unwrap()
    }

    fn add(&self, title: &str, start: &str, end: &str) {
        self.ok(&[
            "task", "add", title, "--date", "2025-08-15", "--start", start, "--end", end,
        ]);
    }
}

#[test]
fn task_add_and_list() {
    let sb = Sandbox::new();
    let out = sb.ok(&["task", "add", "Standup", "--date", "2025-08-15", "--start", "09:00", "--end", "09:30"]);
    assert!(out.contains("Task created: 1"));

    let tasks = sb.json(&["task", "list", "--json"]);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Standup");
    assert_eq!(tasks[0]["start_date"], "2025-08-15T09:00:00Z");
    assert_eq!(tasks[0]["end_date"], "2025-08-15T09:30:00Z");
    assert_eq!(tasks[0]["status"], "inprogress");
}

#[test]
fn task_list_by_day_excludes_other_days() {
    let sb = Sandbox::new();
    sb.add("Friday", "09:00", "10:00");
    sb.ok(&["task", "add", "Saturday", "--date", "2025-08-16", "--start", "09:00"]);

    let tasks = sb.json(&["task", "list", "--date", "2025-08-15", "--json"]);
    let titles: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Friday"]);
}

#[test]
fn auto_category_uses_keywords() {
    let sb = Sandbox::new();
    sb.ok(&["task", "add", "Buy groceries", "--auto-category"]);
    let tasks = sb.json(&["task", "list", "--json"]);
    assert_eq!(tasks[0]["task_type"], "buy");
}

#[test]
fn done_and_delete() {
    let sb = Sandbox::new();
    sb.add("Dentist", "14:00", "15:00");

    assert!(sb.ok(&["task", "done", "1"]).contains("Task completed: 1"));
    let task = sb.json(&["task", "get", "1"]);
    assert_eq!(task["status"], "done");

    sb.ok(&["task", "delete", "1"]);
    let output = sb.run(&["task", "get", "1"]);
    assert!(!output.status.success());
}

#[test]
fn empty_update_is_rejected() {
    let sb = Sandbox::new();
    sb.add("Dentist", "14:00", "15:00");
    let output = sb.run(&["task", "update", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nothing to update"));
}

#[test]
fn other_users_cannot_see_tasks() {
    let sb = Sandbox::new();
    sb.add("Private", "09:00", "10:00");
    let output = sb.run(&["--user", "mallory", "task", "get", "1"]);
    assert!(!output.status.success());

    let tasks = sb.json(&["--user", "mallory", "task", "list", "--json"]);
    assert!(tasks.as_array().unwrap().is_empty());
}

#[test]
fn blank_user_flag_falls_back_to_environment() {
    let sb = Sandbox::new();
    sb.add("Standup", "09:00", "10:00");
    let tasks = sb.json(&["--user", "  ", "task", "list", "--json"]);
    assert_eq!(tasks.as_array().unwrap().len(), 1);
}

#[test]
fn missing_identity_fails() {
    let sb = Sandbox::new();
    let output = sb
        .command()
        .env_remove("DAYPLAN_USER")
        .args(["task", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("identity.user_id"));
}

#[test]
fn day_show_packs_overlapping_tasks() {
    let sb = Sandbox::new();
    sb.add("First", "09:00", "10:00");
    sb.add("Second", "09:15", "10:15");
    sb.add("Lunch", "12:00", "13:00");

    let view = sb.json(&["day", "show", "--date", "2025-08-15", "--json"]);
    assert_eq!(view["date"], "2025-08-15");
    assert_eq!(view["scroll"], 480.0);

    let layout = view["layout"].as_array().unwrap();
    assert_eq!(layout.len(), 3);
    assert_eq!(layout[0]["top"], 540.0);
    assert_eq!(layout[0]["width_percent"], 100.0);
    assert_eq!(layout[1]["top"], 555.0);
    assert_eq!(layout[1]["width_percent"], 75.0);
    assert_eq!(layout[1]["left_percent"], 25.0);
    assert_eq!(layout[2]["column"]["size"], 1);

    let hours = view["hours"].as_array().unwrap();
    assert_eq!(hours.len(), 24);
    assert_eq!(hours[9]["label"], "9AM");
    assert_eq!(hours[9]["coord"], 540.0);
    let grid = view["grid"].as_array().unwrap();
    assert_eq!(grid.len(), 97);
    assert_eq!(grid[4]["major"], true);
    assert!(view["now"].is_null());

    let text = sb.ok(&["day", "show", "--date", "2025-08-15"]);
    assert!(text.starts_with("Friday, August 15, 2025"));
    assert!(text.contains("  9AM  09:00-10:00"));
    assert!(text.contains("\n       09:15-10:15"));
    assert!(text.contains("\n  8AM\n"));
}

#[test]
fn day_move_snaps_and_persists() {
    let sb = Sandbox::new();
    sb.add("Standup", "09:00", "10:00");

    let out = sb.ok(&["day", "move", "1", "--by", "47"]);
    assert!(out.contains("09:45-10:45"));

    let out = sb.ok(&["day", "move", "1", "--to", "08:00"]);
    assert!(out.contains("08:00-09:00"));

    let task = sb.json(&["task", "get", "1"]);
    assert_eq!(task["start_date"], "2025-08-15T08:00:00Z");
    assert_eq!(task["end_date"], "2025-08-15T09:00:00Z");
}

#[test]
fn day_move_accepts_negative_offsets() {
    let sb = Sandbox::new();
    sb.add("Standup", "09:00", "10:00");
    let out = sb.ok(&["day", "move", "1", "--by", "-30"]);
    assert!(out.contains("08:30-09:30"));
}

#[test]
fn day_resize_keeps_minimum_height() {
    let sb = Sandbox::new();
    sb.add("Study", "13:00", "14:00");

    sb.ok(&["day", "resize", "1", "--to", "15:15"]);
    assert_eq!(sb.json(&["task", "get", "1"])["end_date"], "2025-08-15T15:15:00Z");

    sb.ok(&["day", "resize", "1", "--to", "12:00"]);
    assert_eq!(sb.json(&["task", "get", "1"])["end_date"], "2025-08-15T13:15:00Z");
}

#[test]
fn day_suggest_requires_endpoint() {
    let sb = Sandbox::new();
    sb.add("Standup", "09:00", "10:00");
    let output = sb.run(&["day", "suggest", "--date", "2025-08-15"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("suggestion.endpoint"));
}

#[test]
fn week_counts_tasks_per_day() {
    let sb = Sandbox::new();
    sb.add("One", "09:00", "10:00");
    sb.add("Two", "11:00", "12:00");
    sb.ok(&["task", "add", "Next week", "--date", "2025-08-18", "--start", "09:00"]);

    let days = sb.json(&["week", "--date", "2025-08-13", "--json"]);
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2025-08-11");
    assert_eq!(days[4]["tasks"], 2);
    assert_eq!(days[6]["tasks"], 0);

    let next = sb.json(&["week", "--date", "2025-08-13", "--offset", "1", "--json"]);
    assert_eq!(next[0]["date"], "2025-08-18");
    assert_eq!(next[0]["tasks"], 1);
}

#[test]
fn config_set_get_and_reject() {
    let sb = Sandbox::new();
    sb.ok(&["config", "set", "timeline.snap_minutes", "30"]);
    assert_eq!(sb.ok(&["config", "get", "timeline.snap_minutes"]).trim(), "30");

    let output = sb.run(&["config", "get", "no.such.key"]);
    assert!(!output.status.success());

    let output = sb.run(&["config", "set", "timeline.min_height", "-5"]);
    assert!(!output.status.success());

    let path = sb.ok(&["config", "path"]);
    assert!(path.trim().ends_with("config.toml"));
}
