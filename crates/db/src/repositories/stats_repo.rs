//! Read-only aggregation queries for the statistics service.
//!
//! Every query takes the organization id already resolved by the request
//! pipeline; scope is never re-derived here.

use sqlx::PgPool;
use workplan_core::types::{DbId, Timestamp};

use crate::error::StoreResult;
use crate::models::stats::{ProjectStatusCounts, TaskStatusCounts};

/// Provides aggregate counts over one organization's subtree.
pub struct StatsRepo;

impl StatsRepo {
    /// Project counts by status, optionally narrowed to one project.
    pub async fn project_status_counts(
        pool: &PgPool,
        organization_id: DbId,
        project_id: Option<DbId>,
    ) -> StoreResult<ProjectStatusCounts> {
        let counts = sqlx::query_as::<_, ProjectStatusCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'ACTIVE') AS active,
                    COUNT(*) FILTER (WHERE status = 'COMPLETED') AS completed,
                    COUNT(*) FILTER (WHERE status = 'ON_HOLD') AS on_hold,
                    COUNT(*) FILTER (WHERE status = 'CANCELLED') AS cancelled
             FROM projects
             WHERE organization_id = $1 AND ($2::bigint IS NULL OR id = $2)",
        )
        .bind(organization_id)
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }

    /// Task counts by status plus the overdue count, optionally narrowed
    /// to one project. Overdue = past due date and not DONE.
    pub async fn task_status_counts(
        pool: &PgPool,
        organization_id: DbId,
        project_id: Option<DbId>,
    ) -> StoreResult<TaskStatusCounts> {
        let counts = sqlx::query_as::<_, TaskStatusCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE t.status = 'TODO') AS todo,
                    COUNT(*) FILTER (WHERE t.status = 'IN_PROGRESS') AS in_progress,
                    COUNT(*) FILTER (WHERE t.status = 'DONE') AS done,
                    COUNT(*) FILTER (WHERE t.status = 'BLOCKED') AS blocked,
                    COUNT(*) FILTER (WHERE t.due_date < NOW() AND t.status <> 'DONE') AS overdue
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE p.organization_id = $1 AND ($2::bigint IS NULL OR t.project_id = $2)",
        )
        .bind(organization_id)
        .bind(project_id)
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }

    /// Number of tasks and comments created since `since` within the
    /// organization.
    pub async fn recent_activity_count(
        pool: &PgPool,
        organization_id: DbId,
        since: Timestamp,
    ) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM tasks t
                     JOIN projects p ON p.id = t.project_id
                     WHERE p.organization_id = $1 AND t.created_at >= $2)
                  + (SELECT COUNT(*) FROM task_comments c
                     JOIN tasks t ON t.id = c.task_id
                     JOIN projects p ON p.id = t.project_id
                     WHERE p.organization_id = $1 AND c.created_at >= $2)",
        )
        .bind(organization_id)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Number of distinct email addresses appearing as a task assignee or
    /// a comment author within the organization.
    pub async fn active_users_count(pool: &PgPool, organization_id: DbId) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT email) FROM (
                 SELECT t.assignee_email AS email FROM tasks t
                 JOIN projects p ON p.id = t.project_id
                 WHERE p.organization_id = $1
                   AND t.assignee_email IS NOT NULL AND t.assignee_email <> ''
                 UNION
                 SELECT c.author_email AS email FROM task_comments c
                 JOIN tasks t ON t.id = c.task_id
                 JOIN projects p ON p.id = t.project_id
                 WHERE p.organization_id = $1
             ) AS emails",
        )
        .bind(organization_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
