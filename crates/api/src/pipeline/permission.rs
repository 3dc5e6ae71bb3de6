//! Stage 3: permission check.
//!
//! Mutations map to a typed permission predicate; queries on
//! organization-scoped data are guarded against slug arguments that never
//! established a scope. Mutations addressing their target by id are
//! permitted here and confined by the scoped loads in their executors: an
//! entity outside the acting organization is indistinguishable from a
//! missing one.

use serde_json::Value;

use super::{PipelineError, RequestScope};
use crate::ops::{MutationKind, OperationKind, QueryKind};

/// Queries that operate on organization-scoped data.
fn is_protected_query(kind: QueryKind) -> bool {
    matches!(
        kind,
        QueryKind::Organization
            | QueryKind::Organizations
            | QueryKind::Projects
            | QueryKind::Tasks
            | QueryKind::TaskComments
            | QueryKind::OrganizationStats
            | QueryKind::ProjectStats
            | QueryKind::TaskStats
    )
}

/// The per-mutation permission predicate.
fn mutation_permitted(kind: MutationKind, scope: &RequestScope, _args: &Value) -> bool {
    match kind {
        // Creating a project names its organization; the slug must have
        // resolved to an active organization in stage 1.
        MutationKind::CreateProject => scope.organization.is_some(),

        // The remaining mutations address their target by id and are
        // confined to the acting organization by the scoped load.
        MutationKind::UpdateProject
        | MutationKind::DeleteProject
        | MutationKind::CreateTask
        | MutationKind::UpdateTask
        | MutationKind::DeleteTask
        | MutationKind::CreateTaskComment
        | MutationKind::UpdateTaskComment
        | MutationKind::DeleteTaskComment => true,
    }
}

/// Run the permission stage for an operation. Always executed, even when
/// the earlier stages established no organization context.
pub fn check_permission(
    kind: &OperationKind,
    scope: &RequestScope,
    args: &Value,
) -> Result<(), PipelineError> {
    match kind {
        OperationKind::Mutation(mutation) => {
            if mutation_permitted(*mutation, scope, args) {
                Ok(())
            } else {
                Err(PipelineError::PermissionDenied(mutation.name()))
            }
        }
        OperationKind::Query(query) => {
            // A slug argument without an established scope means stage 1
            // was bypassed or failed open; deny rather than serve data.
            let slug_supplied = args
                .get("organization_slug")
                .and_then(Value::as_str)
                .is_some();
            if is_protected_query(*query) && scope.organization.is_none() && slug_supplied {
                Err(PipelineError::AccessDenied)
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::OrgScope;
    use serde_json::json;

    fn scoped() -> RequestScope {
        RequestScope {
            organization: Some(OrgScope {
                organization_id: 1,
                slug: "acme".to_string(),
            }),
        }
    }

    #[test]
    fn test_create_project_requires_scope() {
        let kind = OperationKind::Mutation(MutationKind::CreateProject);
        let args = json!({"input": {"organization_slug": "acme"}});

        assert!(check_permission(&kind, &scoped(), &args).is_ok());

        let denied = check_permission(&kind, &RequestScope::default(), &args);
        assert!(matches!(denied, Err(PipelineError::PermissionDenied(_))));
    }

    #[test]
    fn test_id_addressed_mutations_pass_without_scope() {
        for mutation in [
            MutationKind::UpdateProject,
            MutationKind::DeleteTask,
            MutationKind::CreateTaskComment,
        ] {
            let kind = OperationKind::Mutation(mutation);
            assert!(check_permission(&kind, &RequestScope::default(), &json!({"id": 1})).is_ok());
        }
    }

    #[test]
    fn test_protected_query_with_unresolved_slug_denied() {
        let kind = OperationKind::Query(QueryKind::Tasks);
        let args = json!({"organization_slug": "ghost"});
        let denied = check_permission(&kind, &RequestScope::default(), &args);
        assert!(matches!(denied, Err(PipelineError::AccessDenied)));
    }

    #[test]
    fn test_protected_query_without_slug_passes() {
        let kind = OperationKind::Query(QueryKind::Tasks);
        assert!(check_permission(&kind, &RequestScope::default(), &json!({})).is_ok());
    }

    #[test]
    fn test_protected_query_with_scope_passes() {
        let kind = OperationKind::Query(QueryKind::Tasks);
        let args = json!({"organization_slug": "acme"});
        assert!(check_permission(&kind, &scoped(), &args).is_ok());
    }

    #[test]
    fn test_detail_queries_unprotected() {
        assert!(!is_protected_query(QueryKind::Project));
        assert!(!is_protected_query(QueryKind::Task));
    }
}
