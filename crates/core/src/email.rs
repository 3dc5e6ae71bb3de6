//! Email address shape and blocked-domain checks.

use std::sync::LazyLock;

use regex::Regex;

/// Disposable-mail domains rejected for task assignees and comment authors.
pub const BLOCKED_EMAIL_DOMAINS: &[&str] = &["tempmail.com", "10minutemail.com"];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Whether a string looks like an email address (`local@domain.tld`).
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Return the blocked domain of an address, if its domain is on the
/// blocklist. The comparison is case-insensitive.
pub fn blocked_domain(value: &str) -> Option<&'static str> {
    let domain = value.rsplit('@').next()?.to_ascii_lowercase();
    BLOCKED_EMAIL_DOMAINS
        .iter()
        .find(|blocked| **blocked == domain)
        .copied()
}
