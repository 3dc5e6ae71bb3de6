//! Mutation executors.
//!
//! Every mutation answers with the tri-part envelope. Domain failures
//! become the envelope's error list — validation failures carry the
//! complete violation set, never just the first — and anything unexpected
//! is wrapped in a generic message rather than leaking an internal fault.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use workplan_core::error::CoreError;
use workplan_core::project::ProjectStatus;
use workplan_core::task::{TaskPriority, TaskStatus};
use workplan_core::types::{DbId, Timestamp};
use workplan_db::models::comment::{CreateComment, UpdateComment};
use workplan_db::models::project::{CreateProject, UpdateProject};
use workplan_db::models::task::{CreateTask, UpdateTask};
use workplan_db::repositories::{CommentRepo, ProjectRepo, TaskRepo};
use workplan_db::StoreError;

use super::views::{ProjectView, TaskView};
use super::{MutationKind, MutationResult};
use crate::error::{AppError, AppResult};
use crate::pipeline::RequestScope;
use crate::state::AppState;

fn parse_args<T: DeserializeOwned>(args: &Value) -> AppResult<T> {
    serde_json::from_value(args.clone())
        .map_err(|err| AppError::BadRequest(format!("Invalid arguments: {err}")))
}

fn payload<T: Serialize>(value: T) -> AppResult<Option<Value>> {
    let value = serde_json::to_value(value)
        .map_err(|err| AppError::InternalError(format!("Failed to serialize result: {err}")))?;
    Ok(Some(value))
}

/// Execute a mutation and fold any failure into the envelope.
pub async fn execute(
    state: &AppState,
    kind: MutationKind,
    args: &Value,
    scope: &RequestScope,
) -> MutationResult {
    match run(state, kind, args, scope).await {
        Ok(payload) => MutationResult {
            payload,
            success: true,
            errors: Vec::new(),
        },
        Err(err) => MutationResult {
            payload: None,
            success: false,
            errors: error_messages(kind, err),
        },
    }
}

/// Map a failure to the envelope's error strings.
fn error_messages(kind: MutationKind, err: AppError) -> Vec<String> {
    match err {
        AppError::Store(StoreError::Core(CoreError::Validation(violations))) => {
            violations.messages()
        }
        AppError::Store(StoreError::Core(CoreError::NotFound { entity, .. })) => {
            vec![format!("{entity} not found")]
        }
        AppError::Store(StoreError::Core(
            CoreError::Conflict(message) | CoreError::Forbidden(message),
        )) => vec![message],
        AppError::BadRequest(message) => vec![message],
        other => {
            tracing::error!(operation = kind.name(), error = %other, "Unexpected mutation failure");
            vec!["Unexpected error".to_string()]
        }
    }
}

async fn run(
    state: &AppState,
    kind: MutationKind,
    args: &Value,
    scope: &RequestScope,
) -> AppResult<Option<Value>> {
    let pool = &state.pool;

    match kind {
        MutationKind::CreateProject => {
            #[derive(Deserialize)]
            struct Input {
                name: String,
                description: Option<String>,
                status: Option<ProjectStatus>,
                due_date: Option<NaiveDate>,
            }
            #[derive(Deserialize)]
            struct Args {
                input: Input,
            }
            let Args { input } = parse_args(args)?;
            // The permission stage guarantees a scope here; fail closed
            // regardless.
            let Some(org) = &scope.organization else {
                return Err(CoreError::Forbidden(
                    "create_project requires an organization".to_string(),
                )
                .into());
            };
            let create = CreateProject {
                organization_id: org.organization_id,
                name: input.name,
                description: input.description,
                status: input.status,
                due_date: input.due_date,
            };
            let project = ProjectRepo::create(pool, &create).await?;
            let view = ProjectRepo::find_by_id_with_counts(pool, project.id, scope.org_id())
                .await?
                .map(ProjectView::from);
            payload(view)
        }

        MutationKind::UpdateProject => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
                input: UpdateProject,
            }
            let Args { id, input } = parse_args(args)?;
            let project = ProjectRepo::update(pool, id, &input, scope.org_id()).await?;
            let view = ProjectRepo::find_by_id_with_counts(pool, project.id, scope.org_id())
                .await?
                .map(ProjectView::from);
            payload(view)
        }

        MutationKind::DeleteProject => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
            }
            let Args { id } = parse_args(args)?;
            ProjectRepo::delete(pool, id, scope.org_id()).await?;
            Ok(None)
        }

        MutationKind::CreateTask => {
            #[derive(Deserialize)]
            struct Input {
                project_id: DbId,
                title: String,
                description: Option<String>,
                status: Option<TaskStatus>,
                priority: Option<TaskPriority>,
                assignee_email: Option<String>,
                due_date: Option<Timestamp>,
            }
            #[derive(Deserialize)]
            struct Args {
                input: Input,
            }
            let Args { input } = parse_args(args)?;
            let create = CreateTask {
                project_id: input.project_id,
                title: input.title,
                description: input.description,
                status: input.status,
                priority: input.priority,
                assignee_email: input.assignee_email,
                due_date: input.due_date,
            };
            let task = TaskRepo::create(pool, &create, scope.org_id()).await?;
            let view = TaskRepo::find_by_id_with_counts(pool, task.id, scope.org_id())
                .await?
                .map(TaskView::from);
            payload(view)
        }

        MutationKind::UpdateTask => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
                input: UpdateTask,
            }
            let Args { id, input } = parse_args(args)?;
            let task = TaskRepo::update(pool, id, &input, scope.org_id()).await?;
            let view = TaskRepo::find_by_id_with_counts(pool, task.id, scope.org_id())
                .await?
                .map(TaskView::from);
            payload(view)
        }

        MutationKind::DeleteTask => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
            }
            let Args { id } = parse_args(args)?;
            TaskRepo::delete(pool, id, scope.org_id()).await?;
            Ok(None)
        }

        MutationKind::CreateTaskComment => {
            #[derive(Deserialize)]
            struct Args {
                input: CreateComment,
            }
            let Args { input } = parse_args(args)?;
            let comment = CommentRepo::create(pool, &input, scope.org_id()).await?;
            payload(comment)
        }

        MutationKind::UpdateTaskComment => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
                content: String,
            }
            let Args { id, content } = parse_args(args)?;
            let update = UpdateComment { content };
            let comment = CommentRepo::update(pool, id, &update, scope.org_id()).await?;
            payload(comment)
        }

        MutationKind::DeleteTaskComment => {
            #[derive(Deserialize)]
            struct Args {
                id: DbId,
            }
            let Args { id } = parse_args(args)?;
            CommentRepo::delete(pool, id, scope.org_id()).await?;
            Ok(None)
        }
    }
}
