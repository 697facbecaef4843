//! Per-employee task metrics.
//!
//! Reduces one employee's raw [`TaskRecord`]s to [`EmployeeMetrics`].

use chrono::{DateTime, Utc};

use crate::types::{EmployeeMetrics, Period, TaskRecord};

/// On-time rate reported when no completed task carries a due date.
pub const DEFAULT_ON_TIME_RATE: u8 = 100;

/// Raw counts behind [`EmployeeMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskTally {
    pub completed: u32,
    pub pending: u32,
    pub overdue: u32,
    /// Completed at or before due
    pub on_time: u32,
    /// Completed after due
    pub late: u32,
    /// Completed with no due date; never late, but not part of the rate
    pub undated: u32,
}

impl TaskTally {
    /// Count tasks, judging overdue and lateness against `now`.
    pub fn from_tasks(tasks: &[TaskRecord], now: DateTime<Utc>) -> Self {
        let mut tally = TaskTally::default();

        for task in tasks {
            match task.effective_completed_at(now) {
                Some(completed_at) => {
                    tally.completed += 1;
                    match task.due_at {
                        Some(due_at) if completed_at > due_at => tally.late += 1,
                        Some(_) => tally.on_time += 1,
                        None => tally.undated += 1,
                    }
                }
                None => {
                    tally.pending += 1;
                    if task.due_at.is_some_and(|due_at| due_at < now) {
                        tally.overdue += 1;
                    }
                }
            }
        }

        tally
    }

    /// Percentage of judged completions that were on time.
    ///
    /// An employee with nothing to judge gets [`DEFAULT_ON_TIME_RATE`].
    pub fn on_time_rate(&self) -> u8 {
        let judged = self.on_time + self.late;
        if judged == 0 {
            return DEFAULT_ON_TIME_RATE;
        }
        (100.0 * self.on_time as f64 / judged as f64).round() as u8
    }
}

/// Shorthand for [`TaskTally::from_tasks`].
pub fn tally(tasks: &[TaskRecord], now: DateTime<Utc>) -> TaskTally {
    TaskTally::from_tasks(tasks, now)
}

/// Derive metrics for one employee's tasks within `period`.
pub fn aggregate(tasks: &[TaskRecord], period: &Period, now: DateTime<Utc>) -> EmployeeMetrics {
    let tally = tally(tasks, now);
    let metrics = EmployeeMetrics {
        tasks_completed: tally.completed,
        tasks_pending: tally.pending,
        tasks_overdue: tally.overdue,
        on_time_rate: tally.on_time_rate(),
        avg_tasks_per_week: (tally.completed as f64 / period.weeks() as f64).round() as u32,
    };

    debug_assert_eq!(
        (metrics.tasks_completed + metrics.tasks_pending) as usize,
        tasks.len()
    );
    debug_assert!(metrics.on_time_rate <= 100);
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PeriodKind;
    use chrono::{Duration, TimeZone};

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
    }

    fn task(id: &str, completed_at: Option<DateTime<Utc>>, due_at: Option<DateTime<Utc>>) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            employee_id: "e1".to_string(),
            completed: completed_at.is_some(),
            completed_at,
            due_at,
            name: format!("Task {}", id),
            project_name: "Operations".to_string(),
        }
    }

    fn january() -> Period {
        Period::resolve(PeriodKind::ThisMonth, &at(1, 20))
    }

    #[test]
    fn test_mixed_tasks() {
        let now = at(1, 20);
        let tasks = vec![
            task("1", Some(at(1, 9)), Some(at(1, 10))),
            task("2", Some(at(1, 12)), Some(at(1, 10))),
            task("3", None, Some(at(1, 5))),
        ];

        let tally = TaskTally::from_tasks(&tasks, now);
        assert_eq!(tally.on_time, 1);
        assert_eq!(tally.late, 1);

        let metrics = aggregate(&tasks, &january(), now);
        assert_eq!(metrics.tasks_completed, 2);
        assert_eq!(metrics.tasks_pending, 1);
        assert_eq!(metrics.tasks_overdue, 1);
        assert_eq!(metrics.on_time_rate, 50);
    }

    #[test]
    fn test_no_tasks_gets_perfect_rate() {
        let metrics = aggregate(&[], &january(), at(1, 20));
        assert_eq!(metrics, EmployeeMetrics {
            on_time_rate: 100,
            ..Default::default()
        });
    }

    #[test]
    fn test_completion_without_due_date_is_never_late() {
        let tasks = vec![task("1", Some(at(1, 9)), None), task("2", Some(at(1, 9)), None)];
        let tally = TaskTally::from_tasks(&tasks, at(1, 20));
        assert_eq!(tally.late, 0);
        assert_eq!(tally.undated, 2);
        assert_eq!(tally.on_time_rate(), 100);

        // Undated completions do not dilute a low rate
        let mut tasks = tasks;
        tasks.push(task("3", Some(at(1, 12)), Some(at(1, 10))));
        assert_eq!(TaskTally::from_tasks(&tasks, at(1, 20)).on_time_rate(), 0);
    }

    #[test]
    fn test_completion_exactly_at_due_is_on_time() {
        let tasks = vec![task("1", Some(at(1, 10)), Some(at(1, 10)))];
        assert_eq!(TaskTally::from_tasks(&tasks, at(1, 20)).late, 0);
    }

    #[test]
    fn test_completed_without_timestamp_counts_as_now() {
        let now = at(1, 20);
        let mut late = task("1", None, Some(at(1, 10)));
        late.completed = true;
        let mut early = task("2", None, Some(at(1, 25)));
        early.completed = true;

        let tally = TaskTally::from_tasks(&[late, early], now);
        assert_eq!(tally.completed, 2);
        assert_eq!(tally.late, 1);
        assert_eq!(tally.on_time, 1);
    }

    #[test]
    fn test_pending_without_due_is_not_overdue() {
        let now = at(1, 20);
        let tasks = vec![
            task("1", None, None),
            task("2", None, Some(now + Duration::days(1))),
            task("3", None, Some(now)),
        ];
        let metrics = aggregate(&tasks, &january(), now);
        assert_eq!(metrics.tasks_pending, 3);
        assert_eq!(metrics.tasks_overdue, 0);
    }

    #[test]
    fn test_rate_rounds_to_nearest() {
        // 2 of 3 on time = 66.67
        let tasks = vec![
            task("1", Some(at(1, 1)), Some(at(1, 2))),
            task("2", Some(at(1, 1)), Some(at(1, 2))),
            task("3", Some(at(1, 3)), Some(at(1, 2))),
        ];
        assert_eq!(TaskTally::from_tasks(&tasks, at(1, 20)).on_time_rate(), 67);
    }

    #[test]
    fn test_tally_invariants() {
        let now = at(1, 20);
        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let due = (i % 3 != 0).then(|| at(1, 10));
                let done = (i % 4 != 0).then(|| at(1, 5 + (i % 10) as u32));
                task(&i.to_string(), done, due)
            })
            .collect();

        let tally = TaskTally::from_tasks(&tasks, now);
        let due_dated_completions = tasks
            .iter()
            .filter(|t| t.completed && t.due_at.is_some())
            .count() as u32;

        assert_eq!((tally.pending + tally.completed) as usize, tasks.len());
        assert!(tally.on_time + tally.late <= due_dated_completions);
        assert_eq!(tally.on_time + tally.late + tally.undated, tally.completed);
        assert!(tally.on_time_rate() <= 100);
    }

    #[test]
    fn test_avg_tasks_per_week() {
        let now = at(3, 15);
        let tasks: Vec<_> = (0..10).map(|i| task(&i.to_string(), Some(at(3, 2)), None)).collect();

        // Mar 1 .. Mar 15 12:00 spans 3 weeks
        let this_month = Period::resolve(PeriodKind::ThisMonth, &now);
        assert_eq!(aggregate(&tasks, &this_month, now).avg_tasks_per_week, 3);

        let this_week = Period::resolve(PeriodKind::ThisWeek, &now);
        assert_eq!(aggregate(&tasks, &this_week, now).avg_tasks_per_week, 10);
    }
}
