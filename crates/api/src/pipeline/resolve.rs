//! Stage 1: organization resolution.

use serde_json::Value;
use workplan_db::models::organization::Organization;
use workplan_db::repositories::OrganizationRepo;
use workplan_db::DbPool;

use super::PipelineError;
use crate::ops::OperationKind;

/// Extract an organization slug from an operation's named arguments.
///
/// Checked in order: a direct `organization_slug` argument, then an
/// `organization_slug` field nested in the `input` object (mutation
/// inputs). The fixed set of organization-scoped operation names carries
/// the slug as a direct argument, so it is covered by the first rule.
pub fn extract_slug(args: &Value) -> Option<String> {
    if let Some(slug) = args.get("organization_slug").and_then(Value::as_str) {
        return Some(slug.to_string());
    }

    args.get("input")
        .and_then(|input| input.get("organization_slug"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Resolve the acting organization for an operation.
///
/// No slug in the arguments means no organization context — the operation
/// proceeds unscoped. A slug that does not resolve to an *active*
/// organization fails the whole operation before any domain logic runs.
pub async fn resolve_organization(
    pool: &DbPool,
    kind: &OperationKind,
    args: &Value,
) -> Result<Option<Organization>, PipelineError> {
    let Some(slug) = extract_slug(args) else {
        return Ok(None);
    };

    match OrganizationRepo::find_active_by_slug(pool, &slug).await? {
        Some(organization) => Ok(Some(organization)),
        None => {
            tracing::debug!(
                operation = kind.name(),
                slug = %slug,
                "Organization slug did not resolve to an active organization"
            );
            Err(PipelineError::OrganizationNotFound)
        }
    }
}
