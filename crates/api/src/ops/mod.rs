//! Named-operation boundary.
//!
//! Inbound requests carry an operation name and a map of named arguments.
//! Names parse into [`OperationKind`]; the dispatcher runs the pipeline
//! stages in their fixed order, then hands surviving requests to the query
//! or mutation executor. Mutations always answer with the tri-part
//! `{payload, success, errors}` envelope; queries answer `{data}` and fail
//! soft to `null` rather than raising.

pub mod mutations;
pub mod queries;
pub mod views;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::pipeline::{self, PipelineError, RequestScope};
use crate::state::AppState;

/// Read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Organization,
    Organizations,
    Project,
    Projects,
    Task,
    Tasks,
    TaskComments,
    OrganizationStats,
    ProjectStats,
    TaskStats,
}

impl QueryKind {
    pub fn name(self) -> &'static str {
        match self {
            QueryKind::Organization => "organization",
            QueryKind::Organizations => "organizations",
            QueryKind::Project => "project",
            QueryKind::Projects => "projects",
            QueryKind::Task => "task",
            QueryKind::Tasks => "tasks",
            QueryKind::TaskComments => "task_comments",
            QueryKind::OrganizationStats => "organization_stats",
            QueryKind::ProjectStats => "project_stats",
            QueryKind::TaskStats => "task_stats",
        }
    }
}

/// Write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CreateProject,
    UpdateProject,
    DeleteProject,
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateTaskComment,
    UpdateTaskComment,
    DeleteTaskComment,
}

impl MutationKind {
    pub fn name(self) -> &'static str {
        match self {
            MutationKind::CreateProject => "create_project",
            MutationKind::UpdateProject => "update_project",
            MutationKind::DeleteProject => "delete_project",
            MutationKind::CreateTask => "create_task",
            MutationKind::UpdateTask => "update_task",
            MutationKind::DeleteTask => "delete_task",
            MutationKind::CreateTaskComment => "create_task_comment",
            MutationKind::UpdateTaskComment => "update_task_comment",
            MutationKind::DeleteTaskComment => "delete_task_comment",
        }
    }
}

/// A parsed operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query(QueryKind),
    Mutation(MutationKind),
}

impl OperationKind {
    /// Parse an operation name. Unknown names are rejected before the
    /// pipeline runs.
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "organization" => OperationKind::Query(QueryKind::Organization),
            "organizations" => OperationKind::Query(QueryKind::Organizations),
            "project" => OperationKind::Query(QueryKind::Project),
            "projects" => OperationKind::Query(QueryKind::Projects),
            "task" => OperationKind::Query(QueryKind::Task),
            "tasks" => OperationKind::Query(QueryKind::Tasks),
            "task_comments" => OperationKind::Query(QueryKind::TaskComments),
            "organization_stats" => OperationKind::Query(QueryKind::OrganizationStats),
            "project_stats" => OperationKind::Query(QueryKind::ProjectStats),
            "task_stats" => OperationKind::Query(QueryKind::TaskStats),
            "create_project" => OperationKind::Mutation(MutationKind::CreateProject),
            "update_project" => OperationKind::Mutation(MutationKind::UpdateProject),
            "delete_project" => OperationKind::Mutation(MutationKind::DeleteProject),
            "create_task" => OperationKind::Mutation(MutationKind::CreateTask),
            "update_task" => OperationKind::Mutation(MutationKind::UpdateTask),
            "delete_task" => OperationKind::Mutation(MutationKind::DeleteTask),
            "create_task_comment" => OperationKind::Mutation(MutationKind::CreateTaskComment),
            "update_task_comment" => OperationKind::Mutation(MutationKind::UpdateTaskComment),
            "delete_task_comment" => OperationKind::Mutation(MutationKind::DeleteTaskComment),
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Query(query) => query.name(),
            OperationKind::Mutation(mutation) => mutation.name(),
        }
    }
}

fn default_arguments() -> Value {
    Value::Object(Default::default())
}

/// An inbound operation: a name plus named arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default = "default_arguments")]
    pub arguments: Value,
}

/// The tri-part mutation envelope.
#[derive(Debug, Serialize)]
pub struct MutationResult {
    pub payload: Option<Value>,
    pub success: bool,
    pub errors: Vec<String>,
}

/// Run one operation through the pipeline and its executor.
pub async fn dispatch(state: &AppState, request: &OperationRequest) -> AppResult<Value> {
    let Some(kind) = OperationKind::parse(&request.operation) else {
        return Err(AppError::BadRequest(format!(
            "Unknown operation '{}'",
            request.operation
        )));
    };
    let args = &request.arguments;

    // Stage 1: organization resolution.
    let resolved = match pipeline::resolve_organization(&state.pool, &kind, args).await {
        Ok(resolved) => resolved,
        Err(err) => return pipeline_failure(&kind, err),
    };

    // Stage 2: data isolation.
    let scope = RequestScope::install(resolved);
    if let Some(org) = &scope.organization {
        tracing::debug!(
            operation = kind.name(),
            organization = %org.slug,
            "Installed organization scope"
        );
    }

    // Stage 3: permission check.
    if let Err(err) = pipeline::check_permission(&kind, &scope, args) {
        return pipeline_failure(&kind, err);
    }

    match kind {
        OperationKind::Query(query) => {
            let data = queries::execute(state, query, args, &scope).await?;
            Ok(json!({ "data": data }))
        }
        OperationKind::Mutation(mutation) => {
            let result = mutations::execute(state, mutation, args, &scope).await;
            serde_json::to_value(result)
                .map_err(|err| AppError::InternalError(format!("Failed to serialize result: {err}")))
        }
    }
}

/// Turn a pipeline rejection into the operation's failure shape: `null`
/// data for queries, a failed envelope for mutations. Infrastructure
/// faults propagate as errors.
fn pipeline_failure(kind: &OperationKind, err: PipelineError) -> AppResult<Value> {
    let err = match err {
        PipelineError::Store(store) => return Err(store.into()),
        other => other,
    };
    tracing::debug!(operation = kind.name(), error = %err, "Pipeline rejected operation");

    match kind {
        OperationKind::Query(_) => Ok(json!({ "data": null })),
        OperationKind::Mutation(_) => {
            let message = match err {
                PipelineError::OrganizationNotFound => "Organization not found".to_string(),
                other => other.to_string(),
            };
            Ok(json!({
                "payload": null,
                "success": false,
                "errors": [message],
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_operation_names_parse() {
        let names = [
            "organization",
            "organizations",
            "project",
            "projects",
            "task",
            "tasks",
            "task_comments",
            "organization_stats",
            "project_stats",
            "task_stats",
            "create_project",
            "update_project",
            "delete_project",
            "create_task",
            "update_task",
            "delete_task",
            "create_task_comment",
            "update_task_comment",
            "delete_task_comment",
        ];
        for name in names {
            let kind = OperationKind::parse(name).expect("known operation");
            assert_eq!(kind.name(), name);
        }
    }

    #[test]
    fn test_unknown_operation_rejected() {
        assert!(OperationKind::parse("drop_database").is_none());
        assert!(OperationKind::parse("").is_none());
    }
}
