//! The three-stage isolation/permission pipeline.
//!
//! Every inbound operation runs, in order: organization resolution
//! ([`resolve`]), data isolation ([`scope`]), and the permission check
//! ([`permission`]). Each stage takes immutable inputs and returns an
//! explicit result; there is no shared mutable request context. The first
//! failing stage short-circuits the operation before any domain logic runs.

pub mod permission;
pub mod resolve;
pub mod scope;

pub use permission::check_permission;
pub use resolve::resolve_organization;
pub use scope::{OrgScope, RequestScope};

use workplan_db::StoreError;

/// A pipeline stage rejection. `Store` is infrastructure failure; the
/// other variants are deliberate denials surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Stage 1: a slug was supplied but resolves to no active organization.
    #[error("Organization not found or inactive")]
    OrganizationNotFound,

    /// Stage 3: a mutation's permission predicate returned false.
    #[error("Permission denied for {0}")]
    PermissionDenied(&'static str),

    /// Stage 3: an organization-scoped query was attempted without access.
    #[error("Access denied to organization data")]
    AccessDenied,

    /// The resolution lookup itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
