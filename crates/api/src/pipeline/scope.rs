//! Stage 2: data isolation.
//!
//! When stage 1 resolved an organization, its id is installed here as the
//! request's scope. Every list/detail read for the rest of the request
//! passes [`RequestScope::org_id`] to the repositories, which enforce it
//! in SQL along the ownership path of each entity: projects directly by
//! `organization_id`, tasks through their project, comments through their
//! task's project. Scope is built per request and discarded with it.

use workplan_core::types::DbId;
use workplan_db::models::organization::Organization;

/// The acting organization for one request.
#[derive(Debug, Clone)]
pub struct OrgScope {
    pub organization_id: DbId,
    pub slug: String,
}

/// Immutable per-request scope produced by the isolation stage.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    pub organization: Option<OrgScope>,
}

impl RequestScope {
    /// Install the organization resolved by stage 1, if any.
    pub fn install(resolved: Option<Organization>) -> Self {
        RequestScope {
            organization: resolved.map(|org| OrgScope {
                organization_id: org.id,
                slug: org.slug,
            }),
        }
    }

    /// The organization filter every scoped read must apply. `None` means
    /// the request established no organization context.
    pub fn org_id(&self) -> Option<DbId> {
        self.organization.as_ref().map(|scope| scope.organization_id)
    }
}
