//! Task status state machine, priority ordering, and derived properties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum task title length.
pub const TITLE_MIN_LEN: usize = 2;

/// Maximum task title length.
pub const TITLE_MAX_LEN: usize = 200;

/// Task workflow status. Stored as TEXT in the `tasks` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    /// Wire representation, matching the stored TEXT value.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Blocked => "BLOCKED",
        }
    }

    /// Statuses this one may legally move to. Remaining in the current
    /// status is always allowed and is not listed here.
    ///
    /// DONE is terminal; BLOCKED tasks must be unblocked to TODO first.
    pub fn allowed_transitions(self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Todo => &[TaskStatus::InProgress, TaskStatus::Blocked],
            TaskStatus::InProgress => &[TaskStatus::Done, TaskStatus::Blocked, TaskStatus::Todo],
            TaskStatus::Blocked => &[TaskStatus::Todo],
            TaskStatus::Done => &[],
        }
    }

    /// Whether a transition to `next` is legal. A no-op "transition" to the
    /// same status always is.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        self == next || self.allowed_transitions().contains(&next)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            "BLOCKED" => Ok(TaskStatus::Blocked),
            other => Err(format!("Invalid task status '{other}'")),
        }
    }
}

/// Task priority. Stored as TEXT in the `tasks` table; ordered by
/// [`TaskPriority::weight`] for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Wire representation, matching the stored TEXT value.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }

    /// Numeric weight for priority sorting: LOW=1 .. URGENT=4.
    pub fn weight(self) -> i32 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Urgent => 4,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" => Ok(TaskPriority::Urgent),
            other => Err(format!("Invalid task priority '{other}'")),
        }
    }
}

/// A task is overdue when its due date has passed and it is not DONE.
/// Tasks without a due date are never overdue.
pub fn is_overdue(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>, status: TaskStatus) -> bool {
    match due_date {
        Some(due) => due < now && status != TaskStatus::Done,
        None => false,
    }
}

/// A task can be started while it is still TODO.
pub fn can_start(status: TaskStatus) -> bool {
    status == TaskStatus::Todo
}

/// A task is completed once DONE.
pub fn is_completed(status: TaskStatus) -> bool {
    status == TaskStatus::Done
}

/// Priority implied by a due date: overdue tasks are URGENT, tasks due
/// within one day HIGH, within three days MEDIUM, everything later LOW.
///
/// The comparison is calendar-day based, matching how deadlines are
/// communicated ("due tomorrow"), not a 24-hour window.
pub fn auto_priority(due_date: DateTime<Utc>, now: DateTime<Utc>) -> TaskPriority {
    let days_until_due = (due_date.date_naive() - now.date_naive()).num_days();

    if days_until_due < 0 {
        TaskPriority::Urgent
    } else if days_until_due <= 1 {
        TaskPriority::High
    } else if days_until_due <= 3 {
        TaskPriority::Medium
    } else {
        TaskPriority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_todo_transitions() {
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Todo.can_transition_to(TaskStatus::Blocked));
        assert!(!TaskStatus::Todo.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_in_progress_transitions() {
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Blocked));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Todo));
    }

    #[test]
    fn test_blocked_only_unblocks_to_todo() {
        assert!(TaskStatus::Blocked.can_transition_to(TaskStatus::Todo));
        assert!(!TaskStatus::Blocked.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Blocked.can_transition_to(TaskStatus::Done));
    }

    #[test]
    fn test_done_is_terminal() {
        assert!(TaskStatus::Done.allowed_transitions().is_empty());
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::Todo));
        assert!(!TaskStatus::Done.can_transition_to(TaskStatus::InProgress));
    }

    #[test]
    fn test_same_status_is_not_a_transition() {
        assert!(TaskStatus::Done.can_transition_to(TaskStatus::Done));
        assert!(TaskStatus::Blocked.can_transition_to(TaskStatus::Blocked));
    }

    #[test]
    fn test_priority_weights_ascend() {
        assert_eq!(TaskPriority::Low.weight(), 1);
        assert_eq!(TaskPriority::Medium.weight(), 2);
        assert_eq!(TaskPriority::High.weight(), 3);
        assert_eq!(TaskPriority::Urgent.weight(), 4);
    }

    #[test]
    fn test_default_priority_is_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_overdue_requires_past_date_and_open_status() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);

        assert!(is_overdue(Some(yesterday), now, TaskStatus::Todo));
        assert!(!is_overdue(Some(yesterday), now, TaskStatus::Done));
        assert!(!is_overdue(Some(now + Duration::days(1)), now, TaskStatus::Todo));
        assert!(!is_overdue(None, now, TaskStatus::Todo));
    }

    #[test]
    fn test_auto_priority_overdue_is_urgent() {
        let now = Utc::now();
        assert_eq!(auto_priority(now - Duration::days(2), now), TaskPriority::Urgent);
    }

    #[test]
    fn test_auto_priority_due_tomorrow_is_high() {
        let now = Utc::now();
        assert_eq!(auto_priority(now + Duration::days(1), now), TaskPriority::High);
    }

    #[test]
    fn test_auto_priority_due_in_three_days_is_medium() {
        let now = Utc::now();
        assert_eq!(auto_priority(now + Duration::days(3), now), TaskPriority::Medium);
    }

    #[test]
    fn test_auto_priority_far_future_is_low() {
        let now = Utc::now();
        assert_eq!(auto_priority(now + Duration::days(10), now), TaskPriority::Low);
    }
}
