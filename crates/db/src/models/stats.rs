//! Aggregate count rows produced by the stats repository.

use serde::Serialize;
use sqlx::FromRow;

/// Project counts by status for one organization (optionally narrowed to
/// a single project).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectStatusCounts {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub on_hold: i64,
    pub cancelled: i64,
}

/// Task counts by status for one organization (optionally narrowed to a
/// single project). `overdue` counts tasks past their due date that are
/// not DONE.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskStatusCounts {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
    pub blocked: i64,
    pub overdue: i64,
}
