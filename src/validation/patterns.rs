use std::sync::OnceLock;

use regex::Regex;

/// Digits with optional leading `+`, spaces, dashes and parentheses.
pub const PHONE_PATTERN: &str = r"^[+]?[0-9\s\-()]+$";

/// `YYYY-MM-DD`.
pub const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

const EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Syntactic email check. The local part may not start with a dot or contain
/// consecutive dots.
pub fn is_email(value: &str) -> bool {
    if value.starts_with('.') || value.contains("..") {
        return false;
    }
    email_regex().is_match(value)
}
