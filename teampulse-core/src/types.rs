//! Core domain types for teampulse
//!
//! Raw inputs come from the task-tracking provider ([`TaskRecord`],
//! [`EmployeeDirectoryEntry`]); everything else is derived on every request
//! and never stored.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Period** | A symbolic reporting window resolved to concrete instants |
//! | **On-time** | Completed at or before the due instant, or completed with no due instant |
//! | **Overdue** | Still open and past its due instant |
//! | **Top performer** | On-time rate of at least 90 over at least 10 completed tasks |
//! | **Needs attention** | More than 3 overdue tasks, or an on-time rate under 50 |
//!
//! Outward-facing types serialize with camelCase field names, matching the
//! dashboard's JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Role reported for employees whose directory entry carries none.
pub const DEFAULT_ROLE: &str = "Team Member";

// ============================================
// Period
// ============================================

/// Symbolic reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisQuarter,
}

impl PeriodKind {
    /// All kinds, in display order.
    pub const ALL: [PeriodKind; 5] = [
        PeriodKind::ThisWeek,
        PeriodKind::LastWeek,
        PeriodKind::ThisMonth,
        PeriodKind::LastMonth,
        PeriodKind::ThisQuarter,
    ];

    /// Convert to the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::ThisWeek => "this_week",
            PeriodKind::LastWeek => "last_week",
            PeriodKind::ThisMonth => "this_month",
            PeriodKind::LastMonth => "last_month",
            PeriodKind::ThisQuarter => "this_quarter",
        }
    }

    /// Human-readable name (e.g., "Last Month").
    pub fn display_name(&self) -> &'static str {
        match self {
            PeriodKind::ThisWeek => "This Week",
            PeriodKind::LastWeek => "Last Week",
            PeriodKind::ThisMonth => "This Month",
            PeriodKind::LastMonth => "Last Month",
            PeriodKind::ThisQuarter => "This Quarter",
        }
    }

    /// Current periods run up to "now"; historical ones are closed.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            PeriodKind::ThisWeek | PeriodKind::ThisMonth | PeriodKind::ThisQuarter
        )
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeriodKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown period '{}' (expected one of this_week, last_week, this_month, last_month, this_quarter)",
                    s
                ))
            })
    }
}

/// A resolved reporting window. See [`Period::resolve`](crate::period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: DateTime<Utc>,
    /// For open kinds this is "now" and is never used as a filter bound.
    pub end: DateTime<Utc>,
}

// ============================================
// Provider inputs
// ============================================

/// A task as reported by the task-tracking provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub employee_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub name: String,
    pub project_name: String,
}

impl TaskRecord {
    /// Completion instant, treating a completed task with no timestamp as
    /// completed at `now`. Returns `None` for open tasks.
    pub fn effective_completed_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.completed {
            Some(self.completed_at.unwrap_or(now))
        } else {
            None
        }
    }
}

/// Identity of a team member, owned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDirectoryEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl EmployeeDirectoryEntry {
    /// Role for display, falling back to [`DEFAULT_ROLE`].
    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }
}

// ============================================
// Derived metrics
// ============================================

/// Counters derived from one employee's tasks in a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeMetrics {
    pub tasks_completed: u32,
    pub tasks_pending: u32,
    pub tasks_overdue: u32,
    /// 0..=100
    pub on_time_rate: u8,
    pub avg_tasks_per_week: u32,
}

/// Direction of change against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

/// Change in completed tasks against the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Signed percentage change
    pub percent: i32,
}

/// Business figures tracked alongside task metrics.
///
/// These are reported, never computed, by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessFigures {
    pub revenue_generated: f64,
    pub deals_won: u32,
    pub clients_managed: u32,
}

/// Metrics, score and business figures for one employee in one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPerformance {
    #[serde(flatten)]
    pub metrics: EmployeeMetrics,
    /// 1..=5
    pub performance_score: u8,
    #[serde(flatten)]
    pub business: BusinessFigures,
    pub trend: Trend,
}

impl PeriodPerformance {
    /// An all-zero period, score included.
    ///
    /// Used for the previous period when the provider has no baseline, so
    /// the score here sits outside the usual 1..=5 range.
    pub fn empty() -> Self {
        Self {
            metrics: EmployeeMetrics::default(),
            performance_score: 0,
            business: BusinessFigures::default(),
            trend: Trend::default(),
        }
    }
}

/// Full performance picture for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePerformance {
    pub employee_id: String,
    pub employee_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub current_period: PeriodPerformance,
    pub previous_period: PeriodPerformance,
    pub is_top_performer: bool,
    pub needs_attention: bool,
}

/// Team-level roll-up of [`EmployeePerformance`] rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformanceSummary {
    pub period: Period,
    pub total_tasks_completed: u32,
    pub total_revenue: f64,
    pub avg_on_time_rate: u8,
    /// Rounded to one decimal
    pub avg_performance_score: f64,
    pub employees: Vec<EmployeePerformance>,
    pub top_performers: Vec<EmployeePerformance>,
    pub needs_attention: Vec<EmployeePerformance>,
}

/// A recent task completion, for the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub task_name: String,
    pub project_name: String,
    pub completed_at: DateTime<Utc>,
    pub was_on_time: bool,
    /// Present only for late completions of due-dated tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_late: Option<i64>,
}

/// Acknowledgement returned by a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAck {
    pub synced: bool,
    pub timestamp: DateTime<Utc>,
}

/// Narrows the employee set before a team roll-up.
///
/// An empty filter keeps the whole team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    /// Keep only these employee IDs (empty = all)
    pub employee_ids: Vec<String>,
    /// Keep only employees with this role (case-insensitive)
    pub role: Option<String>,
}

impl SummaryFilter {
    /// Whether an employee passes this filter.
    pub fn matches(&self, entry: &EmployeeDirectoryEntry) -> bool {
        let id_ok = self.employee_ids.is_empty() || self.employee_ids.iter().any(|id| *id == entry.id);
        let role_ok = self
            .role
            .as_deref()
            .map_or(true, |role| entry.role_or_default().eq_ignore_ascii_case(role));
        id_ok && role_ok
    }
}
