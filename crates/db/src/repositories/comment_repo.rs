//! Repository for the `task_comments` table.
//!
//! Scoped reads join through `tasks` and `projects` so a comment is only
//! visible inside its owning organization.

use sqlx::PgPool;
use workplan_core::error::CoreError;
use workplan_core::types::DbId;
use workplan_core::validate::{validate_comment, CommentCandidate};

use crate::error::{StoreError, StoreResult};
use crate::models::comment::{Comment, CreateComment, UpdateComment};

/// Column list for INSERT/UPDATE RETURNING clauses.
const COLUMNS: &str = "id, task_id, content, author_email, created_at, updated_at";

/// Column list for joined queries (comment alias `c`).
const C_COLUMNS: &str = "c.id, c.task_id, c.content, c.author_email, c.created_at, c.updated_at";

/// Provides validated CRUD operations for task comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment on a task visible in the given organization
    /// scope. Content is stored trimmed.
    pub async fn create(
        pool: &PgPool,
        input: &CreateComment,
        org_scope: Option<DbId>,
    ) -> StoreResult<Comment> {
        let task_exists = sqlx::query_scalar::<_, DbId>(
            "SELECT t.id FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)",
        )
        .bind(input.task_id)
        .bind(org_scope)
        .fetch_optional(pool)
        .await?;
        if task_exists.is_none() {
            return Err(CoreError::not_found("Task", input.task_id).into());
        }

        let content = input.content.trim();
        let candidate = CommentCandidate {
            content,
            author_email: &input.author_email,
        };
        let violations = validate_comment(&candidate);
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let query = format!(
            "INSERT INTO task_comments (task_id, content, author_email)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(input.task_id)
            .bind(content)
            .bind(&input.author_email)
            .fetch_one(pool)
            .await?;
        Ok(comment)
    }

    /// Find a comment by ID within the given organization scope.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        org_scope: Option<DbId>,
    ) -> StoreResult<Option<Comment>> {
        let query = format!(
            "SELECT {C_COLUMNS} FROM task_comments c
             JOIN tasks t ON t.id = c.task_id
             JOIN projects p ON p.id = t.project_id
             WHERE c.id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(pool)
            .await?;
        Ok(comment)
    }

    /// List a task's comments oldest first, within the given organization
    /// scope.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
        org_scope: Option<DbId>,
    ) -> StoreResult<Vec<Comment>> {
        let query = format!(
            "SELECT {C_COLUMNS} FROM task_comments c
             JOIN tasks t ON t.id = c.task_id
             JOIN projects p ON p.id = t.project_id
             WHERE c.task_id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)
             ORDER BY c.created_at"
        );
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(task_id)
            .bind(org_scope)
            .fetch_all(pool)
            .await?;
        Ok(comments)
    }

    /// Update a comment's content. The merged entity is re-validated
    /// before commit.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComment,
        org_scope: Option<DbId>,
    ) -> StoreResult<Comment> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {C_COLUMNS} FROM task_comments c
             JOIN tasks t ON t.id = c.task_id
             JOIN projects p ON p.id = t.project_id
             WHERE c.id = $1 AND ($2::bigint IS NULL OR p.organization_id = $2)
             FOR UPDATE OF c"
        );
        let previous = sqlx::query_as::<_, Comment>(&select)
            .bind(id)
            .bind(org_scope)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Comment", id))?;

        let content = input.content.trim();
        let candidate = CommentCandidate {
            content,
            author_email: &previous.author_email,
        };
        let violations = validate_comment(&candidate);
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let update = format!(
            "UPDATE task_comments
             SET content = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Comment>(&update)
            .bind(id)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a comment within the given organization scope.
    pub async fn delete(pool: &PgPool, id: DbId, org_scope: Option<DbId>) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM task_comments c
             USING tasks t, projects p
             WHERE c.id = $1 AND t.id = c.task_id AND p.id = t.project_id
               AND ($2::bigint IS NULL OR p.organization_id = $2)",
        )
        .bind(id)
        .bind(org_scope)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Comment", id).into());
        }
        Ok(())
    }
}
