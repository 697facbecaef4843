//! Live provider backed by an external task tracker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::{EmployeeCompletions, HttpTaskTracker, TaskTracker, TeamData};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::types::{Period, TaskRecord};

/// Upper bound on concurrent per-user completion fetches.
const MAX_CONCURRENT_USER_FETCHES: usize = 5;

/// Reads the team from a [`TaskTracker`] workspace.
pub struct LiveProvider {
    tracker: Arc<dyn TaskTracker>,
    workspace_id: String,
}

impl LiveProvider {
    /// Build a provider talking HTTP to the configured tracker.
    ///
    /// Fails with [`Error::Configuration`] if either credential is missing;
    /// no request is made in that case.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let workspace_id = config
            .workspace_id
            .clone()
            .ok_or_else(|| Error::Configuration("provider.workspace_id is not set".to_string()))?;
        let tracker = HttpTaskTracker::new(config)?;

        Ok(Self::with_tracker(Arc::new(tracker), workspace_id))
    }

    /// Build a provider over any tracker implementation.
    pub fn with_tracker(tracker: Arc<dyn TaskTracker>, workspace_id: impl Into<String>) -> Self {
        Self {
            tracker,
            workspace_id: workspace_id.into(),
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Fetch directory and grouped tasks concurrently.
    ///
    /// Completions outside `period` are dropped, so a closed period loses
    /// anything finished after its end. Open tasks are always kept.
    ///
    /// The HTTP tracker walks its own directory listing to group tasks, so
    /// the two listings are separate snapshots. Only employees in the
    /// directory returned here are evaluated.
    pub async fn fetch_team_data(&self, period: &Period) -> Result<TeamData> {
        let (employees, mut tasks_by_employee) = tokio::try_join!(
            self.tracker.list_workspace_users(&self.workspace_id),
            self.tracker
                .list_tasks_grouped_by_assignee(&self.workspace_id, period.start),
        )?;

        for tasks in tasks_by_employee.values_mut() {
            tasks.retain(|t| t.completed_at.map_or(true, |at| period.contains(at)));
        }

        tracing::info!(
            workspace_id = %self.workspace_id,
            period = %period.kind,
            employees = employees.len(),
            assignees = tasks_by_employee.len(),
            "Fetched live team data"
        );

        Ok(TeamData {
            employees,
            tasks_by_employee,
            profiles: Default::default(),
        })
    }

    /// Fetch recent completions for the first `employee_cap` employees.
    ///
    /// Per-user fetches run concurrently behind a semaphore. Each employee
    /// keeps their `per_employee_cap` most recent completions. Any failed
    /// fetch fails the whole call and cancels the rest.
    pub async fn fetch_recent_completions(
        &self,
        since: DateTime<Utc>,
        employee_cap: usize,
        per_employee_cap: usize,
    ) -> Result<Vec<EmployeeCompletions>> {
        let directory = self.tracker.list_workspace_users(&self.workspace_id).await?;
        let permits = Arc::new(Semaphore::new(
            employee_cap.clamp(1, MAX_CONCURRENT_USER_FETCHES),
        ));

        let mut fetches = JoinSet::new();
        for (index, employee) in directory.into_iter().take(employee_cap).enumerate() {
            let tracker = Arc::clone(&self.tracker);
            let workspace_id = self.workspace_id.clone();
            let permits = Arc::clone(&permits);

            fetches.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Provider(format!("fetch limiter closed: {}", e)))?;
                let tasks = tracker
                    .list_completed_tasks_for_user(&employee.id, &workspace_id, since)
                    .await?;
                let tasks = most_recent_completions(tasks, per_employee_cap);
                Ok::<_, Error>((index, EmployeeCompletions { employee, tasks }))
            });
        }

        let mut results = Vec::with_capacity(fetches.len());
        while let Some(joined) = fetches.join_next().await {
            let fetched = joined
                .map_err(|e| Error::Provider(format!("completion fetch aborted: {}", e)))??;
            results.push(fetched);
        }
        results.sort_by_key(|(index, _)| *index);

        tracing::debug!(
            employees = results.len(),
            since = %since,
            "Fetched live recent completions"
        );

        Ok(results.into_iter().map(|(_, completions)| completions).collect())
    }
}

/// Completed tasks only, newest first, at most `cap`.
fn most_recent_completions(mut tasks: Vec<TaskRecord>, cap: usize) -> Vec<TaskRecord> {
    tasks.retain(|t| t.completed);
    tasks.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    tasks.truncate(cap);
    tasks
}
