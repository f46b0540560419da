//! Instructions sent along with the day's tasks, and unwrapping of the text
//! that comes back.

use indoc::formatdoc;

use crate::task::Task;

/// Builds the instruction text for a schedule suggestion.
///
/// # Errors
/// The tasks cannot be serialized.
pub fn build_prompt(tasks: &[Task], min_gap_minutes: i64) -> Result<String, serde_json::Error> {
    let tasks_json = serde_json::to_string(tasks)?;
    Ok(formatdoc! {r#"
        You help a user organize the tasks of one day.
        Given an array of tasks in JSON format:
        1. Set each task's "task_type" from its "title". Choose from "buy", "appointment", "go", "study", or null when unsure. A task_type that is already set is a hint; keep it unless the title clearly says otherwise.
        2. Give every task a "start_date" and an "end_date" as full ISO 8601 timestamps on the same day as its current "start_date". "end_date" must be after "start_date".
        3. Tasks must not overlap, and consecutive tasks must be at least {min_gap_minutes} minutes apart.
        4. Return the array with the same "id" values in the exact same JSON format, with no other text.

        Tasks to process:
        {tasks_json}"#,
        min_gap_minutes = min_gap_minutes,
        tasks_json = tasks_json,
    })
}

/// Pulls the JSON out of a reply that may wrap it in a ```` ```json ````
/// fence. Text without a fence is returned trimmed.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[open + 3..];
    // Skip the info string (`json`, or nothing) up to the end of the line.
    let body_start = after_fence.find('\n').map_or(after_fence.len(), |i| i + 1);
    let body = &after_fence[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}
