//! Organization entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use workplan_core::types::{DbId, Timestamp};

/// An organization row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub contact_email: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new organization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub contact_email: String,
    /// Explicit slug; derived from `name` when omitted. Never changes
    /// after creation.
    pub slug: Option<String>,
}

/// DTO for updating an existing organization. All fields are optional;
/// the slug is not updatable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
}

/// An organization together with its project aggregates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrganizationWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub organization: Organization,
    pub project_count: i64,
    pub active_project_count: i64,
    pub completed_project_count: i64,
}
