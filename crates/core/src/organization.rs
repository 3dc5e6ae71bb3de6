//! Organization naming rules and derived properties.
//!
//! Organizations are the unit of tenancy: they own projects, and every
//! scoped read in the system filters through one.

use crate::stats::completion_rate;

/// Minimum organization name length.
pub const NAME_MIN_LEN: usize = 2;

/// Maximum organization name length.
pub const NAME_MAX_LEN: usize = 100;

/// Names an organization may not take, compared case-insensitively.
/// These collide with routing prefixes and seeded test data.
pub const RESERVED_NAMES: &[&str] = &["admin", "api", "www", "test", "demo"];

/// Whether a name is reserved. The blocklist comparison is
/// case-insensitive; stored names remain case-sensitive otherwise.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// An organization can be hard-deleted only while it owns no projects.
pub fn can_be_deleted(project_count: i64) -> bool {
    project_count == 0
}

/// An organization can be deactivated only while it owns no ACTIVE project.
pub fn can_be_deactivated(active_project_count: i64) -> bool {
    active_project_count == 0
}

/// Share of an organization's projects that are COMPLETED, as a percentage
/// rounded to one decimal. 0 when the organization owns no projects.
pub fn project_completion_rate(completed: i64, total: i64) -> f64 {
    completion_rate(completed, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_rejected() {
        for name in RESERVED_NAMES {
            assert!(is_reserved_name(name));
        }
    }

    #[test]
    fn test_reserved_name_check_is_case_insensitive() {
        assert!(is_reserved_name("Admin"));
        assert!(is_reserved_name("API"));
        assert!(is_reserved_name("Demo"));
    }

    #[test]
    fn test_ordinary_names_not_reserved() {
        assert!(!is_reserved_name("Test Organization"));
        assert!(!is_reserved_name("acme"));
    }

    #[test]
    fn test_can_be_deleted_requires_no_projects() {
        assert!(can_be_deleted(0));
        assert!(!can_be_deleted(1));
    }

    #[test]
    fn test_can_be_deactivated_requires_no_active_projects() {
        assert!(can_be_deactivated(0));
        assert!(!can_be_deactivated(3));
    }

    #[test]
    fn test_project_completion_rate_half() {
        assert_eq!(project_completion_rate(1, 2), 50.0);
    }
}
