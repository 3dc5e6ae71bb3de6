//! Slug derivation for organization names.
//!
//! Slugs are URL-safe, lowercase, and unique; the store resolves collisions
//! by retrying with numeric suffixes (`base`, `base-1`, `base-2`, ...).

/// Derive a slug from a display name.
///
/// Lowercases, keeps ASCII alphanumerics, and collapses every other run of
/// characters into a single hyphen. Leading and trailing hyphens are
/// trimmed, so `"Test Organization!"` becomes `"test-organization"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// The `n`-th candidate slug for a base: the base itself for `n == 0`,
/// otherwise `base-n`.
pub fn candidate(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic_name() {
        assert_eq!(slugify("Test Organization"), "test-organization");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Test Organization!"), "test-organization");
        assert_eq!(slugify("Acme, Inc."), "acme-inc");
    }

    #[test]
    fn test_slugify_collapses_separator_runs() {
        assert_eq!(slugify("a  --  b"), "a-b");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  hello  "), "hello");
        assert_eq!(slugify("!!x!!"), "x");
    }

    #[test]
    fn test_slugify_preserves_digits() {
        assert_eq!(slugify("Area 51"), "area-51");
    }

    #[test]
    fn test_candidate_zero_is_base() {
        assert_eq!(candidate("test-organization", 0), "test-organization");
    }

    #[test]
    fn test_candidate_appends_suffix() {
        assert_eq!(candidate("test-organization", 1), "test-organization-1");
        assert_eq!(candidate("test-organization", 12), "test-organization-12");
    }
}
