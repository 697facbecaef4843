//! Team-level roll-up.

use crate::types::{EmployeePerformance, Period, TeamPerformanceSummary};

/// Roll per-employee results up into a team summary.
///
/// `top_performers` and `needs_attention` are uncapped subsets of
/// `employees`, in the same order. An empty team yields zero for every
/// aggregate.
pub fn build(period: Period, employees: Vec<EmployeePerformance>) -> TeamPerformanceSummary {
    let total_tasks_completed: u32 = employees
        .iter()
        .map(|e| e.current_period.metrics.tasks_completed)
        .sum();
    let total_revenue: f64 = employees
        .iter()
        .map(|e| e.current_period.business.revenue_generated)
        .sum();

    let (avg_on_time_rate, avg_performance_score) = if employees.is_empty() {
        (0, 0.0)
    } else {
        let count = employees.len() as f64;
        let rate_sum: f64 = employees
            .iter()
            .map(|e| e.current_period.metrics.on_time_rate as f64)
            .sum();
        let score_sum: f64 = employees
            .iter()
            .map(|e| e.current_period.performance_score as f64)
            .sum();
        (
            (rate_sum / count).round() as u8,
            round_tenths(score_sum / count),
        )
    };

    let top_performers = employees
        .iter()
        .filter(|e| e.is_top_performer)
        .cloned()
        .collect();
    let needs_attention = employees
        .iter()
        .filter(|e| e.needs_attention)
        .cloned()
        .collect();

    tracing::debug!(
        period = %period.kind,
        employees = employees.len(),
        total_tasks_completed,
        avg_on_time_rate,
        "Built team summary"
    );

    TeamPerformanceSummary {
        period,
        total_tasks_completed,
        total_revenue,
        avg_on_time_rate,
        avg_performance_score,
        employees,
        top_performers,
        needs_attention,
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
