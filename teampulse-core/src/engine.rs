//! Request-level entry points.
//!
//! [`TeamAnalytics`] ties the pieces together for each request:
//! resolve the period, select a provider, fetch, evaluate, roll up.
//! A provider is selected afresh on every call; nothing is cached.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::analytics::{activity, evaluate_employee, summary};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::provider::{LiveProvider, TaskFeedProvider, TaskTracker};
use crate::types::{
    ActivityEvent, EmployeePerformance, Period, PeriodKind, SummaryFilter, SyncAck,
    TeamPerformanceSummary,
};

/// Where provider data comes from.
enum Source {
    /// Live when the config carries credentials, deterministic otherwise
    Configured(ProviderConfig),
    /// Always live, over an injected tracker
    Tracker {
        tracker: Arc<dyn TaskTracker>,
        workspace_id: String,
    },
}

/// Team performance analytics over a task feed.
pub struct TeamAnalytics {
    source: Source,
}

impl TeamAnalytics {
    /// Analytics driven by provider configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            source: Source::Configured(config),
        }
    }

    /// Analytics over a specific tracker, bypassing configuration.
    pub fn with_tracker(tracker: Arc<dyn TaskTracker>, workspace_id: impl Into<String>) -> Self {
        Self {
            source: Source::Tracker {
                tracker,
                workspace_id: workspace_id.into(),
            },
        }
    }

    /// Select the provider for one request.
    ///
    /// Fails when the config names a tracker that cannot be used.
    pub fn provider(&self, now: DateTime<Utc>) -> Result<TaskFeedProvider> {
        match &self.source {
            Source::Configured(config) => TaskFeedProvider::select(config, now),
            Source::Tracker {
                tracker,
                workspace_id,
            } => Ok(TaskFeedProvider::Live(LiveProvider::with_tracker(
                Arc::clone(tracker),
                workspace_id.clone(),
            ))),
        }
    }

    /// Team summary for `kind`, resolved against the local calendar.
    pub async fn team_performance_summary(
        &self,
        kind: PeriodKind,
        filter: &SummaryFilter,
    ) -> Result<TeamPerformanceSummary> {
        self.team_performance_summary_at(kind, filter, &Local::now())
            .await
    }

    /// Team summary with an explicit clock; `now`'s zone sets the calendar.
    pub async fn team_performance_summary_at<Tz: TimeZone>(
        &self,
        kind: PeriodKind,
        filter: &SummaryFilter,
        now: &DateTime<Tz>,
    ) -> Result<TeamPerformanceSummary> {
        let period = Period::resolve(kind, now);
        let now = now.with_timezone(&Utc);
        let provider = self.provider(now)?;
        let data = provider.fetch_team_data(&period).await?;

        let employees: Vec<_> = data
            .employees
            .iter()
            .filter(|entry| filter.matches(entry))
            .map(|entry| {
                evaluate_employee(
                    entry,
                    data.tasks_for(&entry.id),
                    data.profile_for(&entry.id),
                    &period,
                    now,
                )
            })
            .collect();

        tracing::info!(
            backend = provider.backend_tag(),
            period = %kind,
            directory = data.employees.len(),
            selected = employees.len(),
            "Evaluated team"
        );

        Ok(summary::build(period, employees))
    }

    /// One employee's performance for `kind`.
    pub async fn employee_performance(
        &self,
        employee_id: &str,
        kind: PeriodKind,
    ) -> Result<EmployeePerformance> {
        self.employee_performance_at(employee_id, kind, &Local::now())
            .await
    }

    /// One employee's performance with an explicit clock.
    ///
    /// Fails with [`Error::EmployeeNotFound`] if the directory has no such ID.
    pub async fn employee_performance_at<Tz: TimeZone>(
        &self,
        employee_id: &str,
        kind: PeriodKind,
        now: &DateTime<Tz>,
    ) -> Result<EmployeePerformance> {
        let period = Period::resolve(kind, now);
        let now = now.with_timezone(&Utc);
        let data = self.provider(now)?.fetch_team_data(&period).await?;

        let entry = data
            .employees
            .iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| Error::EmployeeNotFound(employee_id.to_string()))?;

        Ok(evaluate_employee(
            entry,
            data.tasks_for(&entry.id),
            data.profile_for(&entry.id),
            &period,
            now,
        ))
    }

    /// Most recent completions across the team, at most `limit`.
    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEvent>> {
        self.recent_activity_at(limit, Utc::now()).await
    }

    /// Recent activity with an explicit clock.
    pub async fn recent_activity_at(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let provider = self.provider(now)?;
        let completions = provider
            .fetch_recent_completions(
                activity::lookback_start(now),
                activity::LIVE_EMPLOYEE_CAP,
                activity::LIVE_TASKS_PER_EMPLOYEE,
            )
            .await?;

        let feed = activity::build(&completions, limit, now);
        tracing::debug!(
            backend = provider.backend_tag(),
            events = feed.len(),
            limit,
            "Built activity feed"
        );
        Ok(feed)
    }

    /// Acknowledge a sync request.
    ///
    /// Every read already fetches fresh data, so there is nothing to refresh.
    pub fn trigger_sync(&self) -> SyncAck {
        self.trigger_sync_at(Utc::now())
    }

    pub fn trigger_sync_at(&self, now: DateTime<Utc>) -> SyncAck {
        tracing::info!(timestamp = %now, "Sync requested");
        SyncAck {
            synced: true,
            timestamp: now,
        }
    }
}
