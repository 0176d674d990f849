use std::sync::LazyLock;

use regex::Regex;

use crate::db::models::ContactSubmission;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_MESSAGE_LEN: usize = 5000;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// A submission that passed validation, with values normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Syntactic check only; deliverability is never verified.
pub fn is_plausible_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate every field of a contact submission.
///
/// Problems are collected rather than short-circuited so the caller can show
/// them all at once. Each message starts with the offending field name.
pub fn validate_submission(submission: &ContactSubmission) -> Result<ValidContact, Vec<String>> {
    let mut errors = Vec::new();

    let name = check_text("name", &submission.name, MAX_NAME_LEN, &mut errors);

    let email = submission.email.trim();
    if email.is_empty() {
        errors.push("email: cannot be empty or only whitespace".to_string());
    } else if !is_plausible_email(email) {
        errors.push("email: invalid email format".to_string());
    }

    let subject = check_text("subject", &submission.subject, MAX_SUBJECT_LEN, &mut errors);
    let message = check_text("message", &submission.message, MAX_MESSAGE_LEN, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidContact {
        name,
        email: email.to_lowercase(),
        subject,
        message,
    })
}

fn check_text(field: &str, value: &str, max_len: usize, errors: &mut Vec<String>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(format!("{field}: cannot be empty or only whitespace"));
    } else if trimmed.chars().count() > max_len {
        errors.push(format!("{field}: must be at most {max_len} characters"));
    }
    trimmed.to_string()
}
