//! Read models returned by queries and mutation payloads.
//!
//! Each view flattens the stored entity with its derived, read-only
//! fields. Derivations live in `workplan-core`; views just wire counts
//! and the clock into them.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use workplan_core::project::{self, ProjectStatus};
use workplan_core::stats::completion_rate;
use workplan_core::task::{self, TaskPriority, TaskStatus};
use workplan_core::types::{DbId, Timestamp};
use workplan_core::organization;
use workplan_db::models::organization::OrganizationWithCounts;
use workplan_db::models::project::ProjectWithCounts;
use workplan_db::models::stats::{ProjectStatusCounts, TaskStatusCounts};
use workplan_db::models::task::TaskWithCounts;

#[derive(Debug, Serialize)]
pub struct OrganizationView {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub contact_email: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub project_count: i64,
    pub active_project_count: i64,
    pub project_completion_rate: f64,
    pub can_be_deleted: bool,
}

impl From<OrganizationWithCounts> for OrganizationView {
    fn from(row: OrganizationWithCounts) -> Self {
        let project_completion_rate =
            organization::project_completion_rate(row.completed_project_count, row.project_count);
        let can_be_deleted = organization::can_be_deleted(row.project_count);
        let org = row.organization;
        OrganizationView {
            id: org.id,
            name: org.name,
            slug: org.slug,
            contact_email: org.contact_email,
            is_active: org.is_active,
            created_at: org.created_at,
            updated_at: org.updated_at,
            project_count: row.project_count,
            active_project_count: row.active_project_count,
            project_completion_rate,
            can_be_deleted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectView {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub task_count: i64,
    pub completed_task_count: i64,
    pub completion_percentage: f64,
    pub is_overdue: bool,
    pub can_add_tasks: bool,
    pub can_be_completed: bool,
}

impl From<ProjectWithCounts> for ProjectView {
    fn from(row: ProjectWithCounts) -> Self {
        let p = row.project;
        let completion_percentage =
            project::completion_percentage(row.completed_task_count, row.task_count);
        let is_overdue = project::is_overdue(p.due_date, Utc::now().date_naive(), p.status);
        let can_add_tasks = project::can_add_tasks(p.status);
        let can_be_completed =
            project::can_be_completed(row.task_count - row.completed_task_count);
        ProjectView {
            id: p.id,
            organization_id: p.organization_id,
            name: p.name,
            description: p.description,
            status: p.status,
            due_date: p.due_date,
            created_at: p.created_at,
            updated_at: p.updated_at,
            task_count: row.task_count,
            completed_task_count: row.completed_task_count,
            completion_percentage,
            is_overdue,
            can_add_tasks,
            can_be_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskView {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_email: Option<String>,
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub comment_count: i64,
    pub is_overdue: bool,
    pub can_start: bool,
    pub is_completed: bool,
    pub priority_weight: i32,
}

impl From<TaskWithCounts> for TaskView {
    fn from(row: TaskWithCounts) -> Self {
        let t = row.task;
        let is_overdue = task::is_overdue(t.due_date, Utc::now(), t.status);
        TaskView {
            id: t.id,
            project_id: t.project_id,
            title: t.title,
            description: t.description,
            status: t.status,
            priority: t.priority,
            assignee_email: t.assignee_email,
            due_date: t.due_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
            comment_count: row.comment_count,
            is_overdue,
            can_start: task::can_start(t.status),
            is_completed: task::is_completed(t.status),
            priority_weight: t.priority.weight(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectStatsView {
    pub total_projects: i64,
    pub active_projects: i64,
    pub completed_projects: i64,
    pub on_hold_projects: i64,
    pub cancelled_projects: i64,
    pub completion_rate: f64,
}

impl From<ProjectStatusCounts> for ProjectStatsView {
    fn from(counts: ProjectStatusCounts) -> Self {
        ProjectStatsView {
            total_projects: counts.total,
            active_projects: counts.active,
            completed_projects: counts.completed,
            on_hold_projects: counts.on_hold,
            cancelled_projects: counts.cancelled,
            completion_rate: completion_rate(counts.completed, counts.total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskStatsView {
    pub total_tasks: i64,
    pub todo_tasks: i64,
    pub in_progress_tasks: i64,
    pub done_tasks: i64,
    pub blocked_tasks: i64,
    pub overdue_tasks: i64,
    pub completion_rate: f64,
}

impl From<TaskStatusCounts> for TaskStatsView {
    fn from(counts: TaskStatusCounts) -> Self {
        TaskStatsView {
            total_tasks: counts.total,
            todo_tasks: counts.todo,
            in_progress_tasks: counts.in_progress,
            done_tasks: counts.done,
            blocked_tasks: counts.blocked,
            overdue_tasks: counts.overdue,
            completion_rate: completion_rate(counts.done, counts.total),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizationStatsView {
    pub project_stats: ProjectStatsView,
    pub task_stats: TaskStatsView,
    pub recent_activity_count: i64,
    pub active_users_count: i64,
}
