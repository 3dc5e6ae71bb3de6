//! Repository for the `projects` table.

use chrono::Utc;
use sqlx::PgPool;
use workplan_core::error::CoreError;
use workplan_core::types::DbId;
use workplan_core::validate::{validate_project, ProjectCandidate};

use crate::error::{StoreError, StoreResult};
use crate::models::project::{
    CreateProject, Project, ProjectFilter, ProjectWithCounts, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, organization_id, name, description, status, due_date, created_at, updated_at";

/// Column list for the with-counts read model (project alias `p`).
const COUNT_COLUMNS: &str = "\
    p.id, p.organization_id, p.name, p.description, p.status, p.due_date, \
    p.created_at, p.updated_at, \
    COUNT(t.id) AS task_count, \
    COUNT(t.id) FILTER (WHERE t.status = 'DONE') AS completed_task_count";

fn map_name_conflict(err: sqlx::Error) -> StoreError {
    if StoreError::is_unique_violation(&err, "uq_projects_organization_name") {
        StoreError::Core(CoreError::Conflict(
            "A project with this name already exists in the organization.".to_string(),
        ))
    } else {
        err.into()
    }
}

/// Provides validated CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project after validating the candidate. The
    /// per-organization name uniqueness race settles at the unique index.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> StoreResult<Project> {
        let status = input.status.unwrap_or_default();
        let candidate = ProjectCandidate {
            name: &input.name,
            status,
            due_date: input.due_date,
        };
        let violations = validate_project(&candidate, None, Utc::now().date_naive());
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let query = format!(
            "INSERT INTO projects (organization_id, name, description, status, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(input.organization_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(status)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
            .map_err(map_name_conflict)?;
        Ok(project)
    }

    /// Find a project by ID within the given organization scope.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org_scope: Option<DbId>,
    ) -> StoreResult<Option<Project>> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE id = $1 AND ($2::bigint IS NULL OR organization_id = $2)"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    /// Find a project by ID with task aggregates, within the given
    /// organization scope.
    pub async fn find_by_id_with_counts(
        pool: &PgPool,
        id: DbId,
        org_scope: Option<DbId>,
    ) -> StoreResult<Option<ProjectWithCounts>> {
        let query = format!(
            "SELECT {COUNT_COLUMNS} FROM projects p
             LEFT JOIN tasks t ON t.project_id = p.id
             WHERE p.id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)
             GROUP BY p.id"
        );
        let project = sqlx::query_as::<_, ProjectWithCounts>(&query)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    /// List projects with task aggregates, newest first, within the given
    /// organization scope and filters.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        org_scope: Option<DbId>,
    ) -> StoreResult<Vec<ProjectWithCounts>> {
        let query = format!(
            "SELECT {COUNT_COLUMNS} FROM projects p
             LEFT JOIN tasks t ON t.project_id = p.id
             WHERE ($1::bigint IS NULL OR p.organization_id = $1)
               AND ($2::text IS NULL OR p.status = $2)
               AND ($3::text IS NULL
                    OR p.name ILIKE '%' || $3 || '%'
                    OR p.description ILIKE '%' || $3 || '%')
             GROUP BY p.id
             ORDER BY p.created_at DESC"
        );
        let projects = sqlx::query_as::<_, ProjectWithCounts>(&query)
            .bind(org_scope)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(&filter.search)
            .fetch_all(pool)
            .await?;
        Ok(projects)
    }

    /// Update a project. Only non-`None` fields in `input` are applied;
    /// the merged entity is re-validated, including the status transition
    /// table, before commit.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
        org_scope: Option<DbId>,
    ) -> StoreResult<Project> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE id = $1 AND ($2::bigint IS NULL OR organization_id = $2)
             FOR UPDATE"
        );
        let previous = sqlx::query_as::<_, Project>(&select)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", id))?;

        let name = input.name.as_deref().unwrap_or(&previous.name);
        let description = input
            .description
            .as_deref()
            .or(previous.description.as_deref());
        let status = input.status.unwrap_or(previous.status);
        let due_date = input.due_date.or(previous.due_date);

        let candidate = ProjectCandidate {
            name,
            status,
            due_date,
        };
        let violations = validate_project(
            &candidate,
            Some(previous.status),
            Utc::now().date_naive(),
        );
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let update = format!(
            "UPDATE projects
             SET name = $2, description = $3, status = $4, due_date = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&update)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(status)
            .bind(due_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_name_conflict)?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a project within the given organization scope. Tasks and
    /// comments underneath it are removed by the cascade.
    pub async fn delete(pool: &PgPool, id: DbId, org_scope: Option<DbId>) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM projects
             WHERE id = $1 AND ($2::bigint IS NULL OR organization_id = $2)",
        )
        .bind(id)
        .bind(org_scope)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Project", id).into());
        }
        Ok(())
    }
}
