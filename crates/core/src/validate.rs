//! Full-entity validation run by the store before every write.
//!
//! Each entity has one pure entry point taking the candidate (post-merge
//! for updates), the previous persisted state when updating, and whatever
//! cross-entity context the rules need (a task's owning project status, an
//! organization's active-project count). Rules run in three passes — field
//! constraints, cross-field constraints, then status transitions — and
//! every violation is collected so callers see the complete set in one
//! round trip. Time-dependent rules take the clock as an argument; nothing
//! here performs I/O.

use chrono::{DateTime, NaiveDate, Utc};

use crate::email;
use crate::organization;
use crate::project::{self, ProjectStatus};
use crate::task::{TaskStatus, TITLE_MAX_LEN, TITLE_MIN_LEN};

/// A single validation failure, tied to the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Violation {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The complete set of violations for one candidate entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The violation messages, in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|v| v.message.clone()).collect()
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Violations(violations)
    }
}

fn check_email(violations: &mut Vec<Violation>, field: &'static str, value: &str) {
    if !email::is_valid_email(value) {
        violations.push(Violation::new(
            field,
            format!("'{value}' is not a valid email address."),
        ));
    } else if let Some(domain) = email::blocked_domain(value) {
        violations.push(Violation::new(
            field,
            format!("Email domain \"{domain}\" is not allowed."),
        ));
    }
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// Candidate organization state, post-merge for updates.
#[derive(Debug, Clone)]
pub struct OrganizationCandidate<'a> {
    pub name: &'a str,
    pub contact_email: &'a str,
    pub is_active: bool,
    /// Number of ACTIVE projects the organization currently owns,
    /// supplied by the store for the deactivation rule.
    pub active_project_count: i64,
}

/// Previous persisted organization state relevant to validation.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationPrevious {
    pub is_active: bool,
}

/// Validate an organization candidate. `previous` is `None` on create.
pub fn validate_organization(
    candidate: &OrganizationCandidate<'_>,
    previous: Option<&OrganizationPrevious>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let name_len = candidate.name.chars().count();
    if name_len < organization::NAME_MIN_LEN || name_len > organization::NAME_MAX_LEN {
        violations.push(Violation::new(
            "name",
            format!(
                "Organization name must be between {} and {} characters.",
                organization::NAME_MIN_LEN,
                organization::NAME_MAX_LEN
            ),
        ));
    }
    if organization::is_reserved_name(candidate.name) {
        violations.push(Violation::new(
            "name",
            format!("Organization name '{}' is reserved.", candidate.name),
        ));
    }
    check_email(&mut violations, "contact_email", candidate.contact_email);

    // Deactivation is a state change gated on owned projects.
    if let Some(prev) = previous {
        if prev.is_active
            && !candidate.is_active
            && !organization::can_be_deactivated(candidate.active_project_count)
        {
            violations.push(Violation::new(
                "is_active",
                "Cannot deactivate an organization with active projects.",
            ));
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// Candidate project state, post-merge for updates.
#[derive(Debug, Clone)]
pub struct ProjectCandidate<'a> {
    pub name: &'a str,
    pub status: ProjectStatus,
    pub due_date: Option<NaiveDate>,
}

/// Validate a project candidate. `previous_status` is `None` on create;
/// `today` anchors the creation-time due-date rule.
pub fn validate_project(
    candidate: &ProjectCandidate<'_>,
    previous_status: Option<ProjectStatus>,
    today: NaiveDate,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let name_len = candidate.name.chars().count();
    if name_len < project::NAME_MIN_LEN || name_len > project::NAME_MAX_LEN {
        violations.push(Violation::new(
            "name",
            format!(
                "Project name must be between {} and {} characters.",
                project::NAME_MIN_LEN,
                project::NAME_MAX_LEN
            ),
        ));
    }

    // Due dates may not start out in the past; existing projects keep
    // whatever date they have.
    if previous_status.is_none() {
        if let Some(due) = candidate.due_date {
            if due < today {
                violations.push(Violation::new("due_date", "Due date cannot be in the past."));
            }
        }
    }

    if let Some(prev) = previous_status {
        if !prev.can_transition_to(candidate.status) {
            let message = match prev {
                ProjectStatus::Completed => "Completed projects cannot change status.".to_string(),
                ProjectStatus::Cancelled => "Cancelled projects can only be reactivated.".to_string(),
                _ => format!(
                    "Invalid status transition from {prev} to {}.",
                    candidate.status
                ),
            };
            violations.push(Violation::new("status", message));
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Candidate task state, post-merge for updates. `title` is expected to be
/// trimmed by the store before validation.
#[derive(Debug, Clone)]
pub struct TaskCandidate<'a> {
    pub title: &'a str,
    pub status: TaskStatus,
    pub assignee_email: Option<&'a str>,
    pub due_date: Option<DateTime<Utc>>,
    /// Status of the owning project, supplied by the store for the
    /// creation gate.
    pub project_status: ProjectStatus,
}

/// Validate a task candidate. `previous_status` is `None` on create;
/// `now` anchors the due-date rule.
pub fn validate_task(
    candidate: &TaskCandidate<'_>,
    previous_status: Option<TaskStatus>,
    now: DateTime<Utc>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let title_len = candidate.title.chars().count();
    if title_len < TITLE_MIN_LEN || title_len > TITLE_MAX_LEN {
        violations.push(Violation::new(
            "title",
            format!("Task title must be between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters."),
        ));
    }

    if let Some(assignee) = candidate.assignee_email {
        if !assignee.is_empty() {
            check_email(&mut violations, "assignee_email", assignee);
        }
    }

    // Tasks may only be created inside projects still accepting work.
    if previous_status.is_none() && !project::can_add_tasks(candidate.project_status) {
        violations.push(Violation::new(
            "project",
            "Cannot add tasks to completed or cancelled projects.",
        ));
    }

    // Past due dates are only acceptable on tasks ending up DONE.
    if let Some(due) = candidate.due_date {
        if due < now && candidate.status != TaskStatus::Done {
            violations.push(Violation::new(
                "due_date",
                "Due date cannot be in the past for active tasks.",
            ));
        }
    }

    if let Some(prev) = previous_status {
        if !prev.can_transition_to(candidate.status) {
            let message = match prev {
                TaskStatus::Done => "Cannot reopen completed tasks.".to_string(),
                TaskStatus::Blocked => {
                    "Blocked tasks must be unblocked before changing status.".to_string()
                }
                _ => format!(
                    "Invalid status transition from {prev} to {}.",
                    candidate.status
                ),
            };
            violations.push(Violation::new("status", message));
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// Candidate comment state. `content` is expected to be trimmed by the
/// store before validation.
#[derive(Debug, Clone)]
pub struct CommentCandidate<'a> {
    pub content: &'a str,
    pub author_email: &'a str,
}

/// Validate a comment candidate. Comments carry no state machine, so the
/// same rules apply to creates and updates.
pub fn validate_comment(candidate: &CommentCandidate<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    if candidate.content.trim().is_empty() {
        violations.push(Violation::new("content", "Comment content cannot be empty."));
    }
    check_email(&mut violations, "author_email", candidate.author_email);

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn org_candidate(name: &str) -> OrganizationCandidate<'_> {
        OrganizationCandidate {
            name,
            contact_email: "test@example.com",
            is_active: true,
            active_project_count: 0,
        }
    }

    #[test]
    fn test_organization_valid() {
        assert!(validate_organization(&org_candidate("Test Organization"), None).is_empty());
    }

    #[test]
    fn test_organization_reserved_name_rejected() {
        let violations = validate_organization(&org_candidate("admin"), None);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("reserved"));
    }

    #[test]
    fn test_organization_reserved_name_case_insensitive() {
        assert!(!validate_organization(&org_candidate("Demo"), None).is_empty());
    }

    #[test]
    fn test_organization_name_too_short() {
        let violations = validate_organization(&org_candidate("a"), None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }

    #[test]
    fn test_organization_name_too_long() {
        let long = "x".repeat(101);
        assert!(!validate_organization(&org_candidate(&long), None).is_empty());
    }

    #[test]
    fn test_organization_bad_email() {
        let candidate = OrganizationCandidate {
            contact_email: "nope",
            ..org_candidate("Test Organization")
        };
        let violations = validate_organization(&candidate, None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "contact_email");
    }

    #[test]
    fn test_organization_all_violations_reported() {
        let candidate = OrganizationCandidate {
            name: "a",
            contact_email: "nope",
            is_active: true,
            active_project_count: 0,
        };
        // Short name and bad email must both surface.
        assert_eq!(validate_organization(&candidate, None).len(), 2);
    }

    #[test]
    fn test_organization_deactivation_blocked_by_active_projects() {
        let candidate = OrganizationCandidate {
            is_active: false,
            active_project_count: 2,
            ..org_candidate("Test Organization")
        };
        let previous = OrganizationPrevious { is_active: true };
        let violations = validate_organization(&candidate, Some(&previous));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "is_active");
    }

    #[test]
    fn test_organization_deactivation_allowed_without_active_projects() {
        let candidate = OrganizationCandidate {
            is_active: false,
            ..org_candidate("Test Organization")
        };
        let previous = OrganizationPrevious { is_active: true };
        assert!(validate_organization(&candidate, Some(&previous)).is_empty());
    }

    fn project_candidate(status: ProjectStatus) -> ProjectCandidate<'static> {
        ProjectCandidate {
            name: "Test Project",
            status,
            due_date: None,
        }
    }

    fn today() -> NaiveDate {
        chrono::Utc::now().date_naive()
    }

    #[test]
    fn test_project_valid_create() {
        assert!(validate_project(&project_candidate(ProjectStatus::Active), None, today()).is_empty());
    }

    #[test]
    fn test_project_past_due_date_rejected_on_create() {
        let candidate = ProjectCandidate {
            due_date: Some(today() - Duration::days(1)),
            ..project_candidate(ProjectStatus::Active)
        };
        let violations = validate_project(&candidate, None, today());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "due_date");
    }

    #[test]
    fn test_project_past_due_date_tolerated_on_update() {
        let candidate = ProjectCandidate {
            due_date: Some(today() - Duration::days(1)),
            ..project_candidate(ProjectStatus::Active)
        };
        assert!(validate_project(&candidate, Some(ProjectStatus::Active), today()).is_empty());
    }

    #[test]
    fn test_project_completed_is_immutable() {
        for next in [
            ProjectStatus::Active,
            ProjectStatus::OnHold,
            ProjectStatus::Cancelled,
        ] {
            let violations =
                validate_project(&project_candidate(next), Some(ProjectStatus::Completed), today());
            assert_eq!(violations.len(), 1);
            assert!(violations[0].message.contains("Completed projects"));
        }
    }

    #[test]
    fn test_project_cancelled_may_only_reactivate() {
        let ok = validate_project(
            &project_candidate(ProjectStatus::Active),
            Some(ProjectStatus::Cancelled),
            today(),
        );
        assert!(ok.is_empty());

        let bad = validate_project(
            &project_candidate(ProjectStatus::Completed),
            Some(ProjectStatus::Cancelled),
            today(),
        );
        assert_eq!(bad.len(), 1);
        assert!(bad[0].message.contains("reactivated"));
    }

    #[test]
    fn test_project_same_status_update_allowed() {
        assert!(validate_project(
            &project_candidate(ProjectStatus::Completed),
            Some(ProjectStatus::Completed),
            today()
        )
        .is_empty());
    }

    fn task_candidate(status: TaskStatus) -> TaskCandidate<'static> {
        TaskCandidate {
            title: "Test Task",
            status,
            assignee_email: None,
            due_date: None,
            project_status: ProjectStatus::Active,
        }
    }

    #[test]
    fn test_task_valid_create() {
        assert!(validate_task(&task_candidate(TaskStatus::Todo), None, Utc::now()).is_empty());
    }

    #[test]
    fn test_task_title_too_short() {
        let candidate = TaskCandidate {
            title: "x",
            ..task_candidate(TaskStatus::Todo)
        };
        let violations = validate_task(&candidate, None, Utc::now());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "title");
    }

    #[test]
    fn test_task_blocked_assignee_domain_rejected() {
        let candidate = TaskCandidate {
            assignee_email: Some("test@tempmail.com"),
            ..task_candidate(TaskStatus::Todo)
        };
        let violations = validate_task(&candidate, None, Utc::now());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("not allowed"));
    }

    #[test]
    fn test_task_empty_assignee_tolerated() {
        let candidate = TaskCandidate {
            assignee_email: Some(""),
            ..task_candidate(TaskStatus::Todo)
        };
        assert!(validate_task(&candidate, None, Utc::now()).is_empty());
    }

    #[test]
    fn test_task_creation_gate_on_project_status() {
        for status in [ProjectStatus::Completed, ProjectStatus::Cancelled] {
            let candidate = TaskCandidate {
                project_status: status,
                ..task_candidate(TaskStatus::Todo)
            };
            let violations = validate_task(&candidate, None, Utc::now());
            assert_eq!(violations.len(), 1);
            assert!(violations[0].message.contains("Cannot add tasks"));
        }
    }

    #[test]
    fn test_task_creation_gate_skipped_on_update() {
        let candidate = TaskCandidate {
            project_status: ProjectStatus::Completed,
            ..task_candidate(TaskStatus::Todo)
        };
        assert!(validate_task(&candidate, Some(TaskStatus::Todo), Utc::now()).is_empty());
    }

    #[test]
    fn test_task_past_due_date_rejected_unless_done() {
        let now = Utc::now();
        let candidate = TaskCandidate {
            due_date: Some(now - Duration::hours(1)),
            ..task_candidate(TaskStatus::Todo)
        };
        let violations = validate_task(&candidate, None, now);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "due_date");

        let done = TaskCandidate {
            due_date: Some(now - Duration::hours(1)),
            status: TaskStatus::Done,
            ..task_candidate(TaskStatus::Done)
        };
        assert!(validate_task(&done, Some(TaskStatus::InProgress), now).is_empty());
    }

    #[test]
    fn test_task_reopen_forbidden() {
        let violations = validate_task(
            &task_candidate(TaskStatus::Todo),
            Some(TaskStatus::Done),
            Utc::now(),
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Cannot reopen completed tasks"));
    }

    #[test]
    fn test_task_blocked_must_unblock_first() {
        let violations = validate_task(
            &task_candidate(TaskStatus::Done),
            Some(TaskStatus::Blocked),
            Utc::now(),
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("unblocked"));
    }

    #[test]
    fn test_task_todo_cannot_jump_to_done() {
        let violations = validate_task(
            &task_candidate(TaskStatus::Done),
            Some(TaskStatus::Todo),
            Utc::now(),
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Invalid status transition"));
    }

    #[test]
    fn test_comment_valid() {
        let candidate = CommentCandidate {
            content: "This is a test comment",
            author_email: "test@example.com",
        };
        assert!(validate_comment(&candidate).is_empty());
    }

    #[test]
    fn test_comment_whitespace_content_rejected() {
        let candidate = CommentCandidate {
            content: "   ",
            author_email: "test@example.com",
        };
        let violations = validate_comment(&candidate);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("cannot be empty"));
    }

    #[test]
    fn test_comment_author_blocked_domain_rejected() {
        let candidate = CommentCandidate {
            content: "ok content",
            author_email: "spam@10minutemail.com",
        };
        assert_eq!(validate_comment(&candidate).len(), 1);
    }

    #[test]
    fn test_violations_display_joins_messages() {
        let violations = Violations(vec![
            Violation::new("name", "first."),
            Violation::new("status", "second."),
        ]);
        assert_eq!(violations.to_string(), "first.; second.");
        assert_eq!(violations.messages(), vec!["first.", "second."]);
    }
}
