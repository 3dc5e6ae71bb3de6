//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use workplan_core::project::ProjectStatus;
use workplan_core::types::{DbId, Timestamp};

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub organization_id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to ACTIVE if omitted.
    pub status: Option<ProjectStatus>,
    pub due_date: Option<NaiveDate>,
}

/// DTO for updating an existing project. Only non-`None` fields are
/// applied; the whole merged entity is re-validated before commit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub due_date: Option<NaiveDate>,
}

/// Filters for project list queries. All fields are optional and combine
/// with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
}

/// A project together with its task aggregates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub task_count: i64,
    pub completed_task_count: i64,
}
