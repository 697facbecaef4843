//! Performance scoring and classification.
//!
//! The score is a step function of the on-time rate. The two
//! classifications are evaluated independently of the score and of each
//! other, so an employee can be both a top performer and in need of
//! attention.

use crate::types::{EmployeeMetrics, Trend, TrendDirection};

/// Lower bounds of score bands, highest first.
const SCORE_BANDS: [(u8, u8); 4] = [(90, 5), (75, 4), (60, 3), (40, 2)];

/// Score given below the lowest band.
const MIN_SCORE: u8 = 1;

/// Minimum on-time rate for a top performer.
pub const TOP_PERFORMER_RATE: u8 = 90;
/// Minimum completed tasks for a top performer.
pub const TOP_PERFORMER_MIN_COMPLETED: u32 = 10;
/// Overdue count above which an employee needs attention.
pub const ATTENTION_OVERDUE_LIMIT: u32 = 3;
/// On-time rate below which an employee needs attention.
pub const ATTENTION_RATE: u8 = 50;

/// Percent change under which a trend is reported as stable.
const STABLE_TREND_PERCENT: i32 = 5;

/// Map an on-time rate to a 1..=5 score.
pub fn performance_score(on_time_rate: u8) -> u8 {
    SCORE_BANDS
        .iter()
        .find(|(floor, _)| on_time_rate >= *floor)
        .map(|(_, score)| *score)
        .unwrap_or(MIN_SCORE)
}

/// Strong, sufficiently-sampled on-time delivery.
pub fn is_top_performer(metrics: &EmployeeMetrics) -> bool {
    metrics.on_time_rate >= TOP_PERFORMER_RATE
        && metrics.tasks_completed >= TOP_PERFORMER_MIN_COMPLETED
}

/// Too many overdue tasks, or a low on-time rate.
pub fn needs_attention(metrics: &EmployeeMetrics) -> bool {
    metrics.tasks_overdue > ATTENTION_OVERDUE_LIMIT || metrics.on_time_rate < ATTENTION_RATE
}

impl Trend {
    /// Trend in completed tasks from `previous` to `current`.
    ///
    /// With no previous completions there is nothing to compare against,
    /// so the trend is stable at 0%.
    pub fn between(current: &EmployeeMetrics, previous: &EmployeeMetrics) -> Self {
        if previous.tasks_completed == 0 {
            return Trend::default();
        }

        let current = current.tasks_completed as f64;
        let previous = previous.tasks_completed as f64;
        let percent = ((current - previous) / previous * 100.0).round() as i32;

        let direction = if percent.abs() < STABLE_TREND_PERCENT {
            TrendDirection::Stable
        } else if percent > 0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        };

        Trend { direction, percent }
    }

    /// Arrow glyph for terminal output.
    pub fn arrow(&self) -> &'static str {
        match self.direction {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Stable => "→",
        }
    }
}
