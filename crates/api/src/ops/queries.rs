//! Query executors.
//!
//! Every list/detail read passes the request scope's organization filter
//! to the repositories. Lookups that find nothing return `null` data, and
//! stats queries without an established organization context do the same
//! — queries never raise domain failures to the caller.

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use workplan_core::project::ProjectStatus;
use workplan_core::task::{TaskPriority, TaskStatus};
use workplan_core::types::DbId;
use workplan_db::models::project::ProjectFilter;
use workplan_db::models::task::TaskFilter;
use workplan_db::repositories::{CommentRepo, OrganizationRepo, ProjectRepo, StatsRepo, TaskRepo};

use super::views::{
    OrganizationStatsView, OrganizationView, ProjectStatsView, ProjectView, TaskStatsView,
    TaskView,
};
use super::QueryKind;
use crate::error::{AppError, AppResult};
use crate::pipeline::RequestScope;
use crate::state::AppState;

fn parse_args<T: DeserializeOwned>(args: &Value) -> AppResult<T> {
    serde_json::from_value(args.clone())
        .map_err(|err| AppError::BadRequest(format!("Invalid arguments: {err}")))
}

fn to_data<T: Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| AppError::InternalError(format!("Failed to serialize result: {err}")))
}

/// Execute a query operation against the already-scoped store view.
pub async fn execute(
    state: &AppState,
    kind: QueryKind,
    args: &Value,
    scope: &RequestScope,
) -> AppResult<Value> {
    let pool = &state.pool;

    match kind {
        QueryKind::Organization => {
            #[derive(Deserialize)]
            struct Args {
                slug: String,
            }
            let Args { slug } = parse_args(args)?;
            let org = OrganizationRepo::find_active_by_slug_with_counts(pool, &slug).await?;
            to_data(org.map(OrganizationView::from))
        }

        QueryKind::Organizations => {
            let orgs = OrganizationRepo::list_active(pool).await?;
            to_data(orgs.into_iter().map(OrganizationView::from).collect::<Vec<_>>())
        }

        QueryKind::Project => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
            }
            let Args { id } = parse_args(args)?;
            let project = ProjectRepo::find_by_id_with_counts(pool, id, scope.org_id()).await?;
            to_data(project.map(ProjectView::from))
        }

        QueryKind::Projects => {
            #[derive(Deserialize, Default)]
            #[serde(default)]
            struct Args {
                status: Option<ProjectStatus>,
                search: Option<String>,
            }
            let parsed: Args = parse_args(args)?;
            let filter = ProjectFilter {
                status: parsed.status,
                search: parsed.search,
            };
            let projects = ProjectRepo::list(pool, &filter, scope.org_id()).await?;
            to_data(projects.into_iter().map(ProjectView::from).collect::<Vec<_>>())
        }

        QueryKind::Task => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
            }
            let Args { id } = parse_args(args)?;
            let task = TaskRepo::find_by_id_with_counts(pool, id, scope.org_id()).await?;
            to_data(task.map(TaskView::from))
        }

        QueryKind::Tasks => {
            #[derive(Deserialize, Default)]
            #[serde(default)]
            struct Args {
                project_id: Option<DbId>,
                status: Option<TaskStatus>,
                priority: Option<TaskPriority>,
                assignee_email: Option<String>,
                search: Option<String>,
            }
            let parsed: Args = parse_args(args)?;
            let filter = TaskFilter {
                project_id: parsed.project_id,
                status: parsed.status,
                priority: parsed.priority,
                assignee_email: parsed.assignee_email,
                search: parsed.search,
            };
            let tasks = TaskRepo::list(pool, &filter, scope.org_id()).await?;
            to_data(tasks.into_iter().map(TaskView::from).collect::<Vec<_>>())
        }

        QueryKind::TaskComments => {
            #[derive(Deserialize)]
            struct Args {
                task_id: DbId,
            }
            let Args { task_id } = parse_args(args)?;
            let comments = CommentRepo::list_for_task(pool, task_id, scope.org_id()).await?;
            to_data(comments)
        }

        QueryKind::OrganizationStats => {
            let Some(org_id) = scope.org_id() else {
                return Ok(Value::Null);
            };
            let project_counts = StatsRepo::project_status_counts(pool, org_id, None).await?;
            let task_counts = StatsRepo::task_status_counts(pool, org_id, None).await?;
            let week_ago = Utc::now() - Duration::days(7);
            let recent_activity_count =
                StatsRepo::recent_activity_count(pool, org_id, week_ago).await?;
            let active_users_count = StatsRepo::active_users_count(pool, org_id).await?;
            to_data(OrganizationStatsView {
                project_stats: ProjectStatsView::from(project_counts),
                task_stats: TaskStatsView::from(task_counts),
                recent_activity_count,
                active_users_count,
            })
        }

        QueryKind::ProjectStats => {
            #[derive(Deserialize, Default)]
            #[serde(default)]
            struct Args {
                project_id: Option<DbId>,
            }
            let parsed: Args = parse_args(args)?;
            let Some(org_id) = scope.org_id() else {
                return Ok(Value::Null);
            };
            let counts =
                StatsRepo::project_status_counts(pool, org_id, parsed.project_id).await?;
            to_data(ProjectStatsView::from(counts))
        }

        QueryKind::TaskStats => {
            #[derive(Deserialize, Default)]
            #[serde(default)]
            struct Args {
                project_id: Option<DbId>,
            }
            let parsed: Args = parse_args(args)?;
            let Some(org_id) = scope.org_id() else {
                return Ok(Value::Null);
            };
            let counts = StatsRepo::task_status_counts(pool, org_id, parsed.project_id).await?;
            to_data(TaskStatsView::from(counts))
        }
    }
}
