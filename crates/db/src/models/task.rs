//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use workplan_core::task::{TaskPriority, TaskStatus};
use workplan_core::types::{DbId, Timestamp};

/// A task row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
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
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Defaults to TODO if omitted.
    pub status: Option<TaskStatus>,
    /// Defaults to MEDIUM if omitted.
    pub priority: Option<TaskPriority>,
    pub assignee_email: Option<String>,
    pub due_date: Option<Timestamp>,
}

/// DTO for updating an existing task. Only non-`None` fields are applied;
/// the whole merged entity is re-validated before commit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee_email: Option<String>,
    pub due_date: Option<Timestamp>,
}

/// Filters for task list queries. All fields are optional and combine
/// with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub project_id: Option<DbId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring match on the assignee address.
    pub assignee_email: Option<String>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
}

/// A task together with its comment count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub comment_count: i64,
}
