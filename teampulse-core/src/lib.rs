//! # teampulse-core
//!
//! Core library for teampulse - team performance analytics over a
//! task-tracking feed.
//!
//! This library provides:
//! - Domain types for tasks, metrics and team summaries
//! - Period resolution against a local calendar
//! - Task feed providers (live task tracker or a fixed sample team)
//! - Pure analytics: metrics, scoring, roll-ups and the activity feed
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Each request flows through the same steps:
//! - **Resolve:** a [`PeriodKind`] becomes concrete instants
//! - **Fetch:** a [`TaskFeedProvider`] is selected and returns raw data
//! - **Evaluate:** metrics, score and classification per employee
//! - **Roll up:** team totals, means and highlighted subsets
//!
//! Nothing is persisted; every result is derived on demand.
//!
//! ## Example
//!
//! ```rust,no_run
//! use teampulse_core::{Config, PeriodKind, SummaryFilter, TeamAnalytics};
//!
//! # async fn run() -> teampulse_core::Result<()> {
//! let config = Config::load()?;
//! let analytics = TeamAnalytics::new(config.provider);
//!
//! let summary = analytics
//!     .team_performance_summary(PeriodKind::ThisMonth, &SummaryFilter::default())
//!     .await?;
//! println!("{} tasks completed", summary.total_tasks_completed);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, ProviderConfig};
pub use engine::TeamAnalytics;
pub use error::{Error, Result};
pub use provider::{TaskFeedProvider, TaskTracker};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod logging;
pub mod period;
pub mod provider;
pub mod types;
