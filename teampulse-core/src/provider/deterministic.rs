//! Fixed sample team used when no task tracker is configured.
//!
//! Instants are stored as hour offsets from an anchor so the data always
//! looks recent. The same dataset is returned for every period.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::{EmployeeCompletions, EmployeeProfile, PeriodBaseline, TeamData};
use crate::analytics::activity::lookback_start;
use crate::types::{BusinessFigures, EmployeeDirectoryEntry, EmployeeMetrics, TaskRecord};

struct MemberFixture {
    id: &'static str,
    name: &'static str,
    role: &'static str,
    business: BusinessFigures,
    previous: PeriodBaseline,
}

struct TaskFixture {
    id: &'static str,
    owner: &'static str,
    name: &'static str,
    project: &'static str,
    /// Hours before the anchor; `None` while open
    completed_hours_ago: Option<i64>,
    /// Hours after the anchor (negative = already past)
    due_in_hours: Option<i64>,
}

const fn figures(revenue_generated: f64, deals_won: u32, clients_managed: u32) -> BusinessFigures {
    BusinessFigures {
        revenue_generated,
        deals_won,
        clients_managed,
    }
}

const fn baseline(
    tasks_completed: u32,
    tasks_pending: u32,
    tasks_overdue: u32,
    on_time_rate: u8,
    avg_tasks_per_week: u32,
    business: BusinessFigures,
) -> PeriodBaseline {
    PeriodBaseline {
        metrics: EmployeeMetrics {
            tasks_completed,
            tasks_pending,
            tasks_overdue,
            on_time_rate,
            avg_tasks_per_week,
        },
        business,
    }
}

const fn done(
    id: &'static str,
    owner: &'static str,
    name: &'static str,
    project: &'static str,
    hours_ago: i64,
    due_in_hours: Option<i64>,
) -> TaskFixture {
    TaskFixture {
        id,
        owner,
        name,
        project,
        completed_hours_ago: Some(hours_ago),
        due_in_hours,
    }
}

const fn open(
    id: &'static str,
    owner: &'static str,
    name: &'static str,
    project: &'static str,
    due_in_hours: Option<i64>,
) -> TaskFixture {
    TaskFixture {
        id,
        owner,
        name,
        project,
        completed_hours_ago: None,
        due_in_hours,
    }
}

const MEMBERS: &[MemberFixture] = &[
    MemberFixture {
        id: "emp-001",
        name: "Sarah Chen",
        role: "Senior Account Executive",
        business: figures(184_500.0, 14, 22),
        previous: baseline(9, 2, 0, 95, 2, figures(162_000.0, 12, 21)),
    },
    MemberFixture {
        id: "emp-002",
        name: "Marcus Johnson",
        role: "Account Manager",
        business: figures(126_000.0, 9, 18),
        previous: baseline(6, 3, 1, 80, 2, figures(118_500.0, 8, 18)),
    },
    MemberFixture {
        id: "emp-003",
        name: "Priya Patel",
        role: "Sales Development Representative",
        business: figures(42_000.0, 5, 31),
        previous: baseline(5, 1, 0, 90, 1, figures(38_000.0, 6, 28)),
    },
    MemberFixture {
        id: "emp-004",
        name: "David Kim",
        role: "Customer Success Manager",
        business: figures(58_000.0, 4, 26),
        previous: baseline(7, 3, 2, 60, 2, figures(71_000.0, 6, 27)),
    },
    MemberFixture {
        id: "emp-005",
        name: "Elena Rodriguez",
        role: "Account Executive",
        business: figures(97_500.0, 8, 15),
        previous: baseline(3, 1, 0, 100, 1, figures(88_000.0, 7, 14)),
    },
];

const TASKS: &[TaskFixture] = &[
    // Sarah: everything on time
    done("t-101", "emp-001", "Send Northwind renewal proposal", "Enterprise Renewals", 3, Some(20)),
    done("t-102", "emp-001", "Prepare quarterly business review deck", "Enterprise Renewals", 26, Some(-2)),
    done("t-103", "emp-001", "Negotiate Contoso multi-year terms", "Contoso Expansion", 50, Some(0)),
    done("t-104", "emp-001", "Update pipeline forecast", "Forecasting", 75, Some(-48)),
    done("t-105", "emp-001", "Draft Fabrikam statement of work", "Fabrikam Pilot", 100, Some(-80)),
    done("t-106", "emp-001", "Prep executive sponsor call", "Contoso Expansion", 130, Some(-120)),
    done("t-107", "emp-001", "Answer Litware security questionnaire", "Enterprise Renewals", 160, Some(-150)),
    done("t-108", "emp-001", "Coordinate reference calls", "Fabrikam Pilot", 200, Some(-190)),
    done("t-109", "emp-001", "Request pricing approval", "Contoso Expansion", 260, Some(-240)),
    done("t-110", "emp-001", "Review renewal risks", "Enterprise Renewals", 320, Some(-300)),
    done("t-111", "emp-001", "Return Tailspin contract redlines", "Enterprise Renewals", 400, Some(-380)),
    open("t-112", "emp-001", "Plan next quarter account strategy", "Forecasting", Some(72)),
    // Marcus: one late completion
    done("t-201", "emp-002", "Onboard Adventure Works admins", "Account Onboarding", 5, Some(10)),
    done("t-202", "emp-002", "Resolve billing dispute", "Billing", 30, Some(-50)),
    done("t-203", "emp-002", "Quarterly check-in with Wingtip", "Account Reviews", 80, Some(-60)),
    done("t-204", "emp-002", "Send Coho upsell proposal", "Account Reviews", 120, Some(-100)),
    done("t-205", "emp-002", "Collect renewal signatures", "Billing", 190, Some(-170)),
    done("t-206", "emp-002", "Update account health scores", "Account Reviews", 250, Some(-200)),
    open("t-207", "emp-002", "Schedule training webinar", "Account Onboarding", Some(48)),
    open("t-208", "emp-002", "Review support escalations", "Account Reviews", None),
    // Priya: on time, one overdue
    done("t-301", "emp-003", "Qualify inbound leads", "Pipeline Generation", 8, Some(16)),
    done("t-302", "emp-003", "Book discovery calls", "Pipeline Generation", 60, Some(-40)),
    done("t-303", "emp-003", "Refresh outbound sequence", "Outbound", 140, Some(-130)),
    done("t-304", "emp-003", "Research target accounts", "Outbound", 300, Some(-250)),
    open("t-305", "emp-003", "Clean up CRM duplicates", "Pipeline Generation", Some(-24)),
    open("t-306", "emp-003", "Draft cold email variants", "Outbound", Some(96)),
    // David: mostly late, backlog overdue
    done("t-401", "emp-004", "Fix onboarding checklist", "Customer Onboarding", 30, Some(-60)),
    done("t-402", "emp-004", "Run adoption workshop", "Adoption", 70, Some(-20)),
    done("t-403", "emp-004", "Follow up on Proseware escalation", "Escalations", 110, Some(-150)),
    done("t-404", "emp-004", "Write churn risk report", "Adoption", 220, Some(-300)),
    open("t-405", "emp-004", "Review renewal health", "Adoption", Some(-10)),
    open("t-406", "emp-004", "Send satisfaction survey", "Customer Onboarding", Some(-72)),
    open("t-407", "emp-004", "Write up QBR follow-up notes", "Escalations", Some(-120)),
    open("t-408", "emp-004", "Update success plans", "Adoption", Some(-200)),
    open("t-409", "emp-004", "Plan next onboarding cohort", "Customer Onboarding", Some(48)),
    // Elena: mostly undated work
    done("t-501", "emp-005", "Demo for Alpine Ski House", "New Business", 12, Some(24)),
    done("t-502", "emp-005", "Send follow-up materials", "New Business", 45, None),
    done("t-503", "emp-005", "Log call notes", "New Business", 170, None),
];

/// Hand-authored team data anchored at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicProvider {
    anchor: DateTime<Utc>,
}

impl DeterministicProvider {
    /// Dataset whose relative times are measured from `anchor`.
    pub fn anchored_at(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    /// The whole team with profiles and tasks.
    pub fn team_data(&self) -> TeamData {
        let employees: Vec<_> = MEMBERS.iter().map(directory_entry).collect();

        let mut tasks_by_employee: HashMap<String, Vec<TaskRecord>> = HashMap::new();
        for fixture in TASKS {
            tasks_by_employee
                .entry(fixture.owner.to_string())
                .or_default()
                .push(self.task_record(fixture));
        }

        let profiles = MEMBERS
            .iter()
            .map(|m| {
                (
                    m.id.to_string(),
                    EmployeeProfile {
                        business: m.business,
                        previous: Some(m.previous),
                    },
                )
            })
            .collect();

        tracing::debug!(
            employees = employees.len(),
            tasks = TASKS.len(),
            anchor = %self.anchor,
            "Loaded deterministic team data"
        );

        TeamData {
            employees,
            tasks_by_employee,
            profiles,
        }
    }

    /// Completions inside the lookback window, per employee in directory order.
    pub fn recent_completions(&self) -> Vec<EmployeeCompletions> {
        let since = lookback_start(self.anchor);

        MEMBERS
            .iter()
            .map(|member| EmployeeCompletions {
                employee: directory_entry(member),
                tasks: TASKS
                    .iter()
                    .filter(|f| f.owner == member.id)
                    .map(|f| self.task_record(f))
                    .filter(|t| t.completed && t.completed_at.is_some_and(|at| at >= since))
                    .collect(),
            })
            .collect()
    }

    fn task_record(&self, fixture: &TaskFixture) -> TaskRecord {
        let completed_at = fixture
            .completed_hours_ago
            .map(|hours| self.anchor - Duration::hours(hours));

        TaskRecord {
            id: fixture.id.to_string(),
            employee_id: fixture.owner.to_string(),
            completed: completed_at.is_some(),
            completed_at,
            due_at: fixture
                .due_in_hours
                .map(|hours| self.anchor + Duration::hours(hours)),
            name: fixture.name.to_string(),
            project_name: fixture.project.to_string(),
        }
    }
}

fn directory_entry(member: &MemberFixture) -> EmployeeDirectoryEntry {
    EmployeeDirectoryEntry {
        id: member.id.to_string(),
        name: member.name.to_string(),
        avatar_url: None,
        role: Some(member.role.to_string()),
    }
}
