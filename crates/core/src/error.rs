use crate::validate::Violations;

/// Domain-level error type shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(Violations),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a `NotFound` for an entity addressed by numeric id.
    pub fn not_found(entity: &'static str, id: crate::types::DbId) -> Self {
        CoreError::NotFound {
            entity,
            key: format!("id {id}"),
        }
    }
}
