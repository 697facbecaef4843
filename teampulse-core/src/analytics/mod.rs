//! Analytics for teampulse
//!
//! Pure, synchronous steps over already-fetched provider data:
//! - [`metrics`]: per-employee task counters
//! - [`scoring`]: 1-5 score, classifications and trends
//! - [`summary`]: team roll-up
//! - [`activity`]: recent-completion feed
//!
//! Nothing here performs I/O, so every step is testable without a provider.

pub mod activity;
pub mod metrics;
pub mod scoring;
pub mod summary;

pub use metrics::{aggregate, tally, TaskTally};
pub use scoring::{is_top_performer, needs_attention, performance_score};

use chrono::{DateTime, Utc};

use crate::provider::EmployeeProfile;
use crate::types::{
    EmployeeDirectoryEntry, EmployeePerformance, Period, PeriodPerformance, TaskRecord, Trend,
};

/// Evaluate one employee for `period`.
///
/// The previous period comes from the provider's baseline when it has one,
/// and is all zeros otherwise.
pub fn evaluate_employee(
    entry: &EmployeeDirectoryEntry,
    tasks: &[TaskRecord],
    profile: Option<&EmployeeProfile>,
    period: &Period,
    now: DateTime<Utc>,
) -> EmployeePerformance {
    let metrics = aggregate(tasks, period, now);

    let previous_period = profile
        .and_then(|p| p.previous.as_ref())
        .map(|baseline| PeriodPerformance {
            metrics: baseline.metrics,
            performance_score: performance_score(baseline.metrics.on_time_rate),
            business: baseline.business,
            trend: Trend::default(),
        })
        .unwrap_or_else(PeriodPerformance::empty);

    let current_period = PeriodPerformance {
        metrics,
        performance_score: performance_score(metrics.on_time_rate),
        business: profile.map(|p| p.business).unwrap_or_default(),
        trend: Trend::between(&metrics, &previous_period.metrics),
    };

    EmployeePerformance {
        employee_id: entry.id.clone(),
        employee_name: entry.name.clone(),
        role: entry.role_or_default().to_string(),
        avatar_url: entry.avatar_url.clone(),
        current_period,
        previous_period,
        is_top_performer: is_top_performer(&metrics),
        needs_attention: needs_attention(&metrics),
    }
}
