//! Repository for the `tasks` table.
//!
//! Every scoped read joins through `projects` so a task is only visible
//! inside its owning organization.

use chrono::Utc;
use sqlx::PgPool;
use workplan_core::error::CoreError;
use workplan_core::project::ProjectStatus;
use workplan_core::types::DbId;
use workplan_core::validate::{validate_task, TaskCandidate};

use crate::error::{StoreError, StoreResult};
use crate::models::task::{CreateTask, Task, TaskFilter, TaskWithCounts, UpdateTask};

/// Column list for INSERT/UPDATE RETURNING clauses.
const COLUMNS: &str = "\
    id, project_id, title, description, status, priority, \
    assignee_email, due_date, created_at, updated_at";

/// Column list for joined queries (task alias `t`).
const T_COLUMNS: &str = "\
    t.id, t.project_id, t.title, t.description, t.status, t.priority, \
    t.assignee_email, t.due_date, t.created_at, t.updated_at";

/// Comment aggregate selected alongside the task columns.
const COMMENT_COUNT: &str =
    "(SELECT COUNT(*) FROM task_comments c WHERE c.task_id = t.id) AS comment_count";

/// Provides validated CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task after validating the candidate against its owning
    /// project, which must be visible in the given organization scope.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTask,
        org_scope: Option<DbId>,
    ) -> StoreResult<Task> {
        let mut tx = pool.begin().await?;

        // Hold the project row so its status cannot flip mid-insert.
        let project_status = sqlx::query_scalar::<_, ProjectStatus>(
            "SELECT status FROM projects
             WHERE id = $1 AND ($2::bigint IS NULL OR organization_id = $2)
             FOR SHARE",
        )
        .bind(input.project_id)
        .bind(org_scope)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", input.project_id))?;

        let title = input.title.trim();
        let status = input.status.unwrap_or_default();
        let priority = input.priority.unwrap_or_default();

        let candidate = TaskCandidate {
            title,
            status,
            assignee_email: input.assignee_email.as_deref(),
            due_date: input.due_date,
            project_status,
        };
        let violations = validate_task(&candidate, None, Utc::now());
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, priority, assignee_email, due_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(title)
            .bind(&input.description)
            .bind(status)
            .bind(priority)
            .bind(&input.assignee_email)
            .bind(input.due_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Find a task by ID with its comment count, within the given
    /// organization scope.
    pub async fn find_by_id_with_counts(
        pool: &PgPool,
        id: DbId,
        org_scope: Option<DbId>,
    ) -> StoreResult<Option<TaskWithCounts>> {
        let query = format!(
            "SELECT {T_COLUMNS}, {COMMENT_COUNT} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)"
        );
        let task = sqlx::query_as::<_, TaskWithCounts>(&query)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(pool)
            .await?;
        Ok(task)
    }

    /// List tasks with comment counts, newest first, within the given
    /// organization scope and filters.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        org_scope: Option<DbId>,
    ) -> StoreResult<Vec<TaskWithCounts>> {
        let query = format!(
            "SELECT {T_COLUMNS}, {COMMENT_COUNT} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE ($1::bigint IS NULL OR p.organization_id = $1)
               AND ($2::bigint IS NULL OR t.project_id = $2)
               AND ($3::text IS NULL OR t.status = $3)
               AND ($4::text IS NULL OR t.priority = $4)
               AND ($5::text IS NULL OR t.assignee_email ILIKE '%' || $5 || '%')
               AND ($6::text IS NULL
                    OR t.title ILIKE '%' || $6 || '%'
                    OR t.description ILIKE '%' || $6 || '%')
             ORDER BY t.created_at DESC"
        );
        let tasks = sqlx::query_as::<_, TaskWithCounts>(&query)
            .bind(org_scope)
            .bind(filter.project_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.priority.map(|p| p.as_str()))
            .bind(&filter.assignee_email)
            .bind(&filter.search)
            .fetch_all(pool)
            .await?;
        Ok(tasks)
    }

    /// Update a task. Only non-`None` fields in `input` are applied; the
    /// merged entity is re-validated, including the status transition
    /// table, before commit.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
        org_scope: Option<DbId>,
    ) -> StoreResult<Task> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {T_COLUMNS} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)
             FOR UPDATE OF t"
        );
        let previous = sqlx::query_as::<_, Task>(&select)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Task", id))?;

        let project_status = sqlx::query_scalar::<_, ProjectStatus>(
            "SELECT status FROM projects WHERE id = $1",
        )
        .bind(previous.project_id)
        .fetch_one(&mut *tx)
        .await?;

        let title = input.title.as_deref().unwrap_or(&previous.title).trim();
        let description = input
            .description
            .as_deref()
            .or(previous.description.as_deref());
        let status = input.status.unwrap_or(previous.status);
        let priority = input.priority.unwrap_or(previous.priority);
        let assignee_email = input
            .assignee_email
            .as_deref()
            .or(previous.assignee_email.as_deref());
        let due_date = input.due_date.or(previous.due_date);

        let candidate = TaskCandidate {
            title,
            status,
            assignee_email,
            due_date,
            project_status,
        };
        let violations = validate_task(&candidate, Some(previous.status), Utc::now());
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let update = format!(
            "UPDATE tasks
             SET title = $2, description = $3, status = $4, priority = $5,
                 assignee_email = $6, due_date = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Task>(&update)
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(status)
            .bind(priority)
            .bind(assignee_email)
            .bind(due_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a task within the given organization scope. Its comments are
    /// removed by the cascade.
    pub async fn delete(pool: &PgPool, id: DbId, org_scope: Option<DbId>) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM tasks t
             USING projects p
             WHERE t.id = $1 AND p.id = t.project_id
               AND ($2::bigint IS NULL OR p.organization_id = $2)",
        )
        .bind(id)
        .bind(org_scope)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Task", id).into());
        }
        Ok(())
    }
}
