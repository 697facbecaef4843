//! Task feed providers
//!
//! Raw directory and task data comes from one of two interchangeable
//! sources:
//! - [`LiveProvider`]: an external task tracker reached through the
//!   [`TaskTracker`] trait ([`HttpTaskTracker`] in production)
//! - [`DeterministicProvider`]: a fixed, hand-authored team used when no
//!   tracker is configured
//!
//! [`TaskFeedProvider::select`] picks one per call. Nothing is cached
//! between calls, so a configuration change applies on the next request.
//!
//! ## Failure semantics
//!
//! Every fetch is all-or-nothing. Absent credentials are not an error:
//! selection quietly falls back to the deterministic provider. Once both
//! credentials are set the tracker is considered configured, and anything
//! that stops it working surfaces to the caller. An unusable setting is an
//! [`Error::Config`](crate::Error::Config) or
//! [`Error::Provider`](crate::Error::Provider) from
//! [`TaskFeedProvider::select`]; a fetch that fails midway yields
//! [`Error::Provider`](crate::Error::Provider) and no partial data.

mod deterministic;
mod http;
mod live;

pub use deterministic::DeterministicProvider;
pub use http::HttpTaskTracker;
pub use live::LiveProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::types::{BusinessFigures, EmployeeDirectoryEntry, EmployeeMetrics, Period, TaskRecord};

/// The external task-tracking integration.
///
/// Implementations own transport concerns (auth headers, paging, retries).
#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// Members of a workspace, in directory order.
    async fn list_workspace_users(&self, workspace_id: &str) -> Result<Vec<EmployeeDirectoryEntry>>;

    /// Tasks touched since `since`, grouped by assignee ID.
    ///
    /// Includes open tasks and tasks completed after `since`.
    async fn list_tasks_grouped_by_assignee(
        &self,
        workspace_id: &str,
        since: DateTime<Utc>,
    ) -> Result<HashMap<String, Vec<TaskRecord>>>;

    /// Tasks assigned to one user, completed after `since`.
    async fn list_completed_tasks_for_user(
        &self,
        user_id: &str,
        workspace_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TaskRecord>>;
}

/// Figures for the period before the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodBaseline {
    pub metrics: EmployeeMetrics,
    pub business: BusinessFigures,
}

/// Per-employee data a provider knows beyond tasks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmployeeProfile {
    pub business: BusinessFigures,
    pub previous: Option<PeriodBaseline>,
}

/// Everything needed to evaluate a team for one period.
#[derive(Debug, Clone, Default)]
pub struct TeamData {
    /// Directory order is preserved
    pub employees: Vec<EmployeeDirectoryEntry>,
    pub tasks_by_employee: HashMap<String, Vec<TaskRecord>>,
    /// Empty on the live path
    pub profiles: HashMap<String, EmployeeProfile>,
}

impl TeamData {
    /// Tasks for one employee, empty if the provider reported none.
    pub fn tasks_for(&self, employee_id: &str) -> &[TaskRecord] {
        self.tasks_by_employee
            .get(employee_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn profile_for(&self, employee_id: &str) -> Option<&EmployeeProfile> {
        self.profiles.get(employee_id)
    }
}

/// Recent completions for one employee.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeCompletions {
    pub employee: EmployeeDirectoryEntry,
    pub tasks: Vec<TaskRecord>,
}

/// Source of directory and task data.
pub enum TaskFeedProvider {
    Live(LiveProvider),
    Deterministic(DeterministicProvider),
}

impl TaskFeedProvider {
    /// Use the live tracker whenever `config` carries both credentials.
    ///
    /// Without them the deterministic dataset, anchored at `now`, is
    /// returned. With them, a live client that cannot be built is an error
    /// rather than a reason to show sample data.
    pub fn select(config: &ProviderConfig, now: DateTime<Utc>) -> Result<Self> {
        if !config.has_credentials() {
            tracing::debug!("Task tracker not configured, using deterministic data");
            return Ok(TaskFeedProvider::Deterministic(
                DeterministicProvider::anchored_at(now),
            ));
        }

        let live = LiveProvider::from_config(config)?;
        tracing::debug!(workspace_id = live.workspace_id(), "Selected live provider");
        Ok(TaskFeedProvider::Live(live))
    }

    /// Short name for logs and CLI output.
    pub fn backend_tag(&self) -> &'static str {
        match self {
            TaskFeedProvider::Live(_) => "live",
            TaskFeedProvider::Deterministic(_) => "deterministic",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, TaskFeedProvider::Live(_))
    }

    /// Directory and tasks for `period`.
    pub async fn fetch_team_data(&self, period: &Period) -> Result<TeamData> {
        match self {
            TaskFeedProvider::Live(live) => live.fetch_team_data(period).await,
            TaskFeedProvider::Deterministic(fixed) => Ok(fixed.team_data()),
        }
    }

    /// Completions since `since`, per employee.
    ///
    /// The caps bound the live path only; the deterministic feed is
    /// returned whole.
    pub async fn fetch_recent_completions(
        &self,
        since: DateTime<Utc>,
        employee_cap: usize,
        per_employee_cap: usize,
    ) -> Result<Vec<EmployeeCompletions>> {
        match self {
            TaskFeedProvider::Live(live) => {
                live.fetch_recent_completions(since, employee_cap, per_employee_cap)
                    .await
            }
            TaskFeedProvider::Deterministic(fixed) => Ok(fixed.recent_completions()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory [`TaskTracker`] for tests.

    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeTracker {
        pub users: Vec<EmployeeDirectoryEntry>,
        pub tasks: HashMap<String, Vec<TaskRecord>>,
        pub fail_tasks: bool,
        pub fail_user: Option<String>,
        pub user_calls: AtomicUsize,
        pub completed_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TaskTracker for FakeTracker {
        async fn list_workspace_users(&self, _workspace_id: &str) -> Result<Vec<EmployeeDirectoryEntry>> {
            self.user_calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.users.clone())
        }

        async fn list_tasks_grouped_by_assignee(
            &self,
            _workspace_id: &str,
            since: DateTime<Utc>,
        ) -> Result<HashMap<String, Vec<TaskRecord>>> {
            if self.fail_tasks {
                return Err(Error::Provider("API error (503): unavailable".to_string()));
            }
            Ok(self
                .tasks
                .iter()
                .map(|(id, tasks)| {
                    let recent = tasks
                        .iter()
                        .filter(|t| !t.completed || t.completed_at.map_or(true, |at| at >= since))
                        .cloned()
                        .collect();
                    (id.clone(), recent)
                })
                .collect())
        }

        async fn list_completed_tasks_for_user(
            &self,
            user_id: &str,
            _workspace_id: &str,
            since: DateTime<Utc>,
        ) -> Result<Vec<TaskRecord>> {
            if let Ok(mut calls) = self.completed_calls.lock() {
                calls.push(user_id.to_string());
            }
            if self.fail_user.as_deref() == Some(user_id) {
                return Err(Error::Provider(format!("API error (500): {}", user_id)));
            }
            Ok(self
                .tasks
                .get(user_id)
                .map(|tasks| {
                    tasks
                        .iter()
                        .filter(|t| t.completed_at.map_or(false, |at| at >= since))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }
    }
}
