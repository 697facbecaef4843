//! Recent-activity feed.
//!
//! Merges completions from several employees into one feed, newest first.

use chrono::{DateTime, Duration, Utc};

use crate::provider::EmployeeCompletions;
use crate::types::{ActivityEvent, TaskRecord};

/// How far back the feed looks.
pub const LOOKBACK_DAYS: i64 = 7;
/// Employees inspected per feed on the live path.
pub const LIVE_EMPLOYEE_CAP: usize = 5;
/// Completed tasks considered per employee on the live path.
pub const LIVE_TASKS_PER_EMPLOYEE: usize = 3;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Start of the lookback window ending at `now`.
pub fn lookback_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(LOOKBACK_DAYS)
}

/// Build at most `limit` events, sorted by completion time descending.
///
/// Open tasks are skipped. Ties are broken by task ID so the order is
/// stable for identical input.
pub fn build(completions: &[EmployeeCompletions], limit: usize, now: DateTime<Utc>) -> Vec<ActivityEvent> {
    let mut events: Vec<ActivityEvent> = completions
        .iter()
        .flat_map(|entry| {
            entry
                .tasks
                .iter()
                .filter_map(move |task| event_for(entry, task, now))
        })
        .collect();

    events.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    events.truncate(limit);
    events
}

fn event_for(entry: &EmployeeCompletions, task: &TaskRecord, now: DateTime<Utc>) -> Option<ActivityEvent> {
    let completed_at = task.effective_completed_at(now)?;
    let days_late = task
        .due_at
        .filter(|due_at| completed_at > *due_at)
        .map(|due_at| days_ceil(completed_at - due_at));

    Some(ActivityEvent {
        id: task.id.clone(),
        employee_id: entry.employee.id.clone(),
        employee_name: entry.employee.name.clone(),
        task_name: task.name.clone(),
        project_name: task.project_name.clone(),
        completed_at,
        was_on_time: days_late.is_none(),
        days_late,
    })
}

/// Whole days, rounded up, in a positive duration.
fn days_ceil(late_by: Duration) -> i64 {
    let millis = late_by.num_milliseconds();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}
