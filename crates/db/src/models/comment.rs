//! Task comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use workplan_core::types::{DbId, Timestamp};

/// A comment row from the `task_comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub task_id: DbId,
    pub content: String,
    pub author_email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub task_id: DbId,
    pub content: String,
    pub author_email: String,
}

/// DTO for updating an existing comment. Only the content is editable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}
