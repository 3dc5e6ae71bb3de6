//! Project status state machine and derived properties.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats::completion_rate;

/// Minimum project name length.
pub const NAME_MIN_LEN: usize = 2;

/// Maximum project name length.
pub const NAME_MAX_LEN: usize = 200;

/// Project lifecycle status. Stored as TEXT in the `projects` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    /// Wire representation, matching the stored TEXT value.
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses this one may legally move to. Remaining in the current
    /// status is always allowed and is not listed here.
    ///
    /// COMPLETED is terminal; CANCELLED projects may only be reactivated.
    pub fn allowed_transitions(self) -> &'static [ProjectStatus] {
        match self {
            ProjectStatus::Active => &[
                ProjectStatus::Completed,
                ProjectStatus::OnHold,
                ProjectStatus::Cancelled,
            ],
            ProjectStatus::OnHold => &[
                ProjectStatus::Active,
                ProjectStatus::Completed,
                ProjectStatus::Cancelled,
            ],
            ProjectStatus::Completed => &[],
            ProjectStatus::Cancelled => &[ProjectStatus::Active],
        }
    }

    /// Whether a transition to `next` is legal. A no-op "transition" to the
    /// same status always is.
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        self == next || self.allowed_transitions().contains(&next)
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "ON_HOLD" => Ok(ProjectStatus::OnHold),
            "CANCELLED" => Ok(ProjectStatus::Cancelled),
            other => Err(format!("Invalid project status '{other}'")),
        }
    }
}

/// Tasks may only be added to ACTIVE or ON_HOLD projects.
pub fn can_add_tasks(status: ProjectStatus) -> bool {
    matches!(status, ProjectStatus::Active | ProjectStatus::OnHold)
}

/// A project can be marked COMPLETED once every task is DONE.
pub fn can_be_completed(unfinished_task_count: i64) -> bool {
    unfinished_task_count == 0
}

/// Percentage of a project's tasks that are DONE, rounded to one decimal.
/// 0 when the project has no tasks.
pub fn completion_percentage(completed_task_count: i64, task_count: i64) -> f64 {
    completion_rate(completed_task_count, task_count)
}

/// A project is overdue when its due date has passed and it is not
/// COMPLETED. Projects without a due date are never overdue.
pub fn is_overdue(due_date: Option<NaiveDate>, today: NaiveDate, status: ProjectStatus) -> bool {
    match due_date {
        Some(due) => due < today && status != ProjectStatus::Completed,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_active_may_move_anywhere() {
        assert!(ProjectStatus::Active.can_transition_to(ProjectStatus::Completed));
        assert!(ProjectStatus::Active.can_transition_to(ProjectStatus::OnHold));
        assert!(ProjectStatus::Active.can_transition_to(ProjectStatus::Cancelled));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(ProjectStatus::Completed
            .allowed_transitions()
            .is_empty());
        assert!(!ProjectStatus::Completed.can_transition_to(ProjectStatus::Active));
        assert!(!ProjectStatus::Completed.can_transition_to(ProjectStatus::Cancelled));
    }

    #[test]
    fn test_cancelled_may_only_reactivate() {
        assert!(ProjectStatus::Cancelled.can_transition_to(ProjectStatus::Active));
        assert!(!ProjectStatus::Cancelled.can_transition_to(ProjectStatus::Completed));
        assert!(!ProjectStatus::Cancelled.can_transition_to(ProjectStatus::OnHold));
    }

    #[test]
    fn test_same_status_is_not_a_transition() {
        assert!(ProjectStatus::Completed.can_transition_to(ProjectStatus::Completed));
        assert!(ProjectStatus::Cancelled.can_transition_to(ProjectStatus::Cancelled));
    }

    #[test]
    fn test_can_add_tasks_only_active_or_on_hold() {
        assert!(can_add_tasks(ProjectStatus::Active));
        assert!(can_add_tasks(ProjectStatus::OnHold));
        assert!(!can_add_tasks(ProjectStatus::Completed));
        assert!(!can_add_tasks(ProjectStatus::Cancelled));
    }

    #[test]
    fn test_completion_percentage_rounding() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(1, 2), 50.0);
        assert_eq!(completion_percentage(1, 3), 33.3);
        assert_eq!(completion_percentage(2, 3), 66.7);
    }

    #[test]
    fn test_overdue_requires_past_date_and_open_status() {
        let today = date(2026, 8, 6);
        let yesterday = date(2026, 8, 5);

        assert!(is_overdue(Some(yesterday), today, ProjectStatus::Active));
        assert!(!is_overdue(Some(yesterday), today, ProjectStatus::Completed));
        assert!(!is_overdue(Some(today), today, ProjectStatus::Active));
        assert!(!is_overdue(None, today, ProjectStatus::Active));
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::Completed,
            ProjectStatus::OnHold,
            ProjectStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
    }
}
