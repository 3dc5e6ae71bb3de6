//! Repository for the `organizations` table.

use sqlx::PgPool;
use workplan_core::error::CoreError;
use workplan_core::organization;
use workplan_core::slug;
use workplan_core::types::DbId;
use workplan_core::validate::{validate_organization, OrganizationCandidate, OrganizationPrevious};

use crate::error::{StoreError, StoreResult};
use crate::models::organization::{
    CreateOrganization, Organization, OrganizationWithCounts, UpdateOrganization,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, contact_email, is_active, created_at, updated_at";

/// Column list for the with-counts read model (organization alias `o`).
const COUNT_COLUMNS: &str = "\
    o.id, o.name, o.slug, o.contact_email, o.is_active, o.created_at, o.updated_at, \
    COUNT(p.id) AS project_count, \
    COUNT(p.id) FILTER (WHERE p.status = 'ACTIVE') AS active_project_count, \
    COUNT(p.id) FILTER (WHERE p.status = 'COMPLETED') AS completed_project_count";

/// Bound on slug-allocation retries under concurrent creates.
const MAX_SLUG_ATTEMPTS: u32 = 10;

/// Provides validated CRUD operations for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization, deriving a unique slug from the name
    /// when none is supplied.
    ///
    /// Slug collisions resolve by numeric suffix (`base`, `base-1`, ...).
    /// A concurrent writer can take the chosen slug between the lookup and
    /// the insert, so the insert retries on the slug index; name races
    /// settle at the name index on the first attempt.
    pub async fn create(pool: &PgPool, input: &CreateOrganization) -> StoreResult<Organization> {
        let candidate = OrganizationCandidate {
            name: &input.name,
            contact_email: &input.contact_email,
            is_active: true,
            active_project_count: 0,
        };
        let violations = validate_organization(&candidate, None);
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let mut base = match input.slug.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slug::slugify(&input.name),
        };
        // A name of pure punctuation slugifies to nothing.
        if base.is_empty() {
            base = "organization".to_string();
        }

        for _ in 0..MAX_SLUG_ATTEMPTS {
            let taken: Vec<String> = sqlx::query_scalar(
                "SELECT slug FROM organizations WHERE slug = $1 OR slug LIKE $1 || '-%'",
            )
            .bind(&base)
            .fetch_all(pool)
            .await?;

            let mut n = 0u32;
            while taken.contains(&slug::candidate(&base, n)) {
                n += 1;
            }
            let chosen = slug::candidate(&base, n);

            let query = format!(
                "INSERT INTO organizations (name, slug, contact_email)
                 VALUES ($1, $2, $3)
                 RETURNING {COLUMNS}"
            );
            let inserted = sqlx::query_as::<_, Organization>(&query)
                .bind(&input.name)
                .bind(&chosen)
                .bind(&input.contact_email)
                .fetch_one(pool)
                .await;

            match inserted {
                Ok(org) => return Ok(org),
                Err(err) if StoreError::is_unique_violation(&err, "uq_organizations_slug") => {
                    tracing::debug!(slug = %chosen, "Slug taken by concurrent insert, retrying");
                    continue;
                }
                Err(err) if StoreError::is_unique_violation(&err, "uq_organizations_name") => {
                    return Err(StoreError::Core(CoreError::Conflict(
                        "An organization with this name already exists.".to_string(),
                    )));
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StoreError::Core(CoreError::Internal(format!(
            "Could not allocate a unique slug for '{base}'"
        ))))
    }

    /// Find an organization by its internal ID, active or not.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> StoreResult<Option<Organization>> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        let org = sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(org)
    }

    /// Find an active organization by slug. Inactive organizations are
    /// invisible to slug resolution.
    pub async fn find_active_by_slug(pool: &PgPool, slug: &str) -> StoreResult<Option<Organization>> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE slug = $1 AND is_active = TRUE");
        let org = sqlx::query_as::<_, Organization>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(org)
    }

    /// Find an active organization by slug, with project aggregates.
    pub async fn find_active_by_slug_with_counts(
        pool: &PgPool,
        slug: &str,
    ) -> StoreResult<Option<OrganizationWithCounts>> {
        let query = format!(
            "SELECT {COUNT_COLUMNS} FROM organizations o
             LEFT JOIN projects p ON p.organization_id = o.id
             WHERE o.slug = $1 AND o.is_active = TRUE
             GROUP BY o.id"
        );
        let org = sqlx::query_as::<_, OrganizationWithCounts>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(org)
    }

    /// List all active organizations with project aggregates, ordered by
    /// name.
    pub async fn list_active(pool: &PgPool) -> StoreResult<Vec<OrganizationWithCounts>> {
        let query = format!(
            "SELECT {COUNT_COLUMNS} FROM organizations o
             LEFT JOIN projects p ON p.organization_id = o.id
             WHERE o.is_active = TRUE
             GROUP BY o.id
             ORDER BY o.name"
        );
        let orgs = sqlx::query_as::<_, OrganizationWithCounts>(&query)
            .fetch_all(pool)
            .await?;
        Ok(orgs)
    }

    /// Update an organization. Only non-`None` fields in `input` are
    /// applied; the merged entity is re-validated before commit. The slug
    /// never changes.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrganization,
    ) -> StoreResult<Organization> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1 FOR UPDATE");
        let previous = sqlx::query_as::<_, Organization>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Organization", id))?;

        let name = input.name.as_deref().unwrap_or(&previous.name);
        let contact_email = input
            .contact_email
            .as_deref()
            .unwrap_or(&previous.contact_email);
        let is_active = input.is_active.unwrap_or(previous.is_active);

        // The deactivation rule needs the live ACTIVE-project count; skip
        // the query when the flag is not being lowered.
        let active_project_count = if previous.is_active && !is_active {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM projects WHERE organization_id = $1 AND status = 'ACTIVE'",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
        } else {
            0
        };

        let candidate = OrganizationCandidate {
            name,
            contact_email,
            is_active,
            active_project_count,
        };
        let violations = validate_organization(
            &candidate,
            Some(&OrganizationPrevious {
                is_active: previous.is_active,
            }),
        );
        if !violations.is_empty() {
            return Err(StoreError::validation(violations));
        }

        let update = format!(
            "UPDATE organizations
             SET name = $2, contact_email = $3, is_active = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Organization>(&update)
            .bind(id)
            .bind(name)
            .bind(contact_email)
            .bind(is_active)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| {
                if StoreError::is_unique_violation(&err, "uq_organizations_name") {
                    StoreError::Core(CoreError::Conflict(
                        "An organization with this name already exists.".to_string(),
                    ))
                } else {
                    err.into()
                }
            })?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Hard-delete an organization. Refused while it still owns projects;
    /// descendants of a deletable organization are removed by the cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM organizations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(CoreError::not_found("Organization", id).into());
        }

        let project_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE organization_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if !organization::can_be_deleted(project_count) {
            return Err(StoreError::Core(CoreError::Conflict(
                "Cannot delete an organization that still owns projects.".to_string(),
            )));
        }

        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
