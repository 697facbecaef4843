//! teampulse - team performance reports
//!
//! Summarizes task completion, on-time delivery and business figures for a
//! team, reading from the configured task tracker or the built-in sample
//! team when none is configured.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use teampulse_core::format::{format_relative_time, format_revenue};
use teampulse_core::{
    ActivityEvent, Config, EmployeePerformance, PeriodKind, PeriodPerformance, SummaryFilter,
    SyncAck, TeamAnalytics, TeamPerformanceSummary,
};

#[derive(Parser, Debug)]
#[command(name = "teampulse")]
#[command(about = "Team performance analytics from your task tracker")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Team roll-up for a period
    Summary {
        /// this_week, last_week, this_month, last_month or this_quarter
        #[arg(short, long, default_value = "this_month")]
        period: PeriodKind,

        /// Only include these employee IDs (repeatable)
        #[arg(short, long = "employee")]
        employees: Vec<String>,

        /// Only include employees with this role (case-insensitive)
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Performance of one employee
    Employee {
        /// Employee ID
        id: String,

        #[arg(short, long, default_value = "this_month")]
        period: PeriodKind,
    },

    /// Most recent task completions across the team
    Activity {
        /// Maximum number of events
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Request a data refresh
    Sync,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        teampulse_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let analytics = TeamAnalytics::new(config.provider);
    tracing::info!(command = ?args.command, "teampulse starting");

    match args.command {
        Command::Summary {
            period,
            employees,
            role,
        } => {
            let filter = SummaryFilter {
                employee_ids: employees,
                role,
            };
            let summary = analytics
                .team_performance_summary(period, &filter)
                .await
                .context("failed to build team summary")?;
            match args.format {
                OutputFormat::Json => print_json(&summary)?,
                OutputFormat::Text => print_summary(&summary),
            }
        }
        Command::Employee { id, period } => {
            let performance = analytics
                .employee_performance(&id, period)
                .await
                .with_context(|| format!("failed to evaluate employee '{}'", id))?;
            match args.format {
                OutputFormat::Json => print_json(&performance)?,
                OutputFormat::Text => print_employee(&performance, period),
            }
        }
        Command::Activity { limit } => {
            let events = analytics
                .recent_activity(limit)
                .await
                .context("failed to load recent activity")?;
            match args.format {
                OutputFormat::Json => print_json(&events)?,
                OutputFormat::Text => print_activity(&events),
            }
        }
        Command::Sync => {
            let ack = analytics.trigger_sync();
            match args.format {
                OutputFormat::Json => print_json(&ack)?,
                OutputFormat::Text => print_sync(&ack),
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn print_summary(summary: &TeamPerformanceSummary) {
    println!();
    println!("Team Performance: {}", summary.period.kind.display_name());
    println!(
        "{} to {}",
        summary.period.start.format("%Y-%m-%d"),
        summary.period.end.format("%Y-%m-%d")
    );
    println!("{}", "─".repeat(60));

    if summary.employees.is_empty() {
        println!("  No employees match this filter.");
        println!();
        return;
    }

    println!(
        "   Tasks completed: {:<10} Revenue: {}",
        summary.total_tasks_completed,
        format_revenue(summary.total_revenue)
    );
    println!(
        "   On-time rate:    {:<10} Avg score: {:.1}",
        format!("{}%", summary.avg_on_time_rate),
        summary.avg_performance_score
    );
    println!();

    println!(
        "   {:<22} {:>5} {:>7} {:>7} {:>6} {:>5}  Trend",
        "Employee", "Done", "Pending", "Overdue", "OnTime", "Score"
    );
    for employee in &summary.employees {
        let current = &employee.current_period;
        println!(
            "   {:<22} {:>5} {:>7} {:>7} {:>5}% {:>5}  {} {}%",
            truncate(&employee.employee_name, 22),
            current.metrics.tasks_completed,
            current.metrics.tasks_pending,
            current.metrics.tasks_overdue,
            current.metrics.on_time_rate,
            current.performance_score,
            current.trend.arrow(),
            current.trend.percent
        );
    }
    println!();

    if !summary.top_performers.is_empty() {
        println!("TOP PERFORMERS");
        for employee in &summary.top_performers {
            println!("   {} ({})", employee.employee_name, employee.role);
        }
        println!();
    }

    if !summary.needs_attention.is_empty() {
        println!("NEEDS ATTENTION");
        for employee in &summary.needs_attention {
            let metrics = employee.current_period.metrics;
            println!(
                "   {} ({} overdue, {}% on time)",
                employee.employee_name, metrics.tasks_overdue, metrics.on_time_rate
            );
        }
        println!();
    }
}

fn print_employee(performance: &EmployeePerformance, period: PeriodKind) {
    println!();
    println!("{} - {}", performance.employee_name, performance.role);
    println!("{}", "─".repeat(60));

    let mut badges = Vec::new();
    if performance.is_top_performer {
        badges.push("top performer");
    }
    if performance.needs_attention {
        badges.push("needs attention");
    }
    if !badges.is_empty() {
        println!("   [{}]", badges.join(", "));
    }

    print_period(period.display_name(), &performance.current_period);
    print_period("Previous", &performance.previous_period);
}

fn print_period(label: &str, period: &PeriodPerformance) {
    println!();
    println!("{}", label.to_uppercase());
    println!(
        "   Completed: {:<8} Pending: {:<8} Overdue: {}",
        period.metrics.tasks_completed, period.metrics.tasks_pending, period.metrics.tasks_overdue
    );
    println!(
        "   On time:   {:<8} Score:   {:<8} Per week: {}",
        format!("{}%", period.metrics.on_time_rate),
        period.performance_score,
        period.metrics.avg_tasks_per_week
    );
    println!(
        "   Revenue:   {:<8} Deals:   {:<8} Clients: {}",
        format_revenue(period.business.revenue_generated),
        period.business.deals_won,
        period.business.clients_managed
    );
    println!(
        "   Trend:     {} {}%",
        period.trend.arrow(),
        period.trend.percent
    );
}

fn print_activity(events: &[ActivityEvent]) {
    if events.is_empty() {
        println!("No completions in the last week.");
        return;
    }

    let now = Utc::now();
    for event in events {
        let status = match event.days_late {
            Some(days) => format!("{}d late", days),
            None => "on time".to_string(),
        };
        println!(
            "{:>8}  {:<20} {} [{}] ({})",
            format_relative_time(event.completed_at, now),
            truncate(&event.employee_name, 20),
            event.task_name,
            event.project_name,
            status
        );
    }
}

fn print_sync(ack: &SyncAck) {
    println!("Sync acknowledged at {}", ack.timestamp.to_rfc3339());
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
