//! Input checks run before any form is submitted
//!
//! These mirror the rules the API enforces so that obviously bad input never
//! costs a round trip. Each check returns the failing fields mapped to the
//! message shown next to them.

use crate::types::{ContactDraft, FeedItemDraft, PostDraft, UserUpdate};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_MESSAGE_LEN: usize = 10;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
});

/// Field name to message
pub type FieldErrors = BTreeMap<&'static str, String>;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert("email", "Email is required".into());
    } else if !is_valid_email(email) {
        errors.insert("email", "Email is invalid".into());
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.is_empty() {
        errors.insert("password", "Password is required".into());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    check_password(&mut errors, password);
    errors
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", name, "Name is required");
    check_email(&mut errors, email);
    check_password(&mut errors, password);
    if password != confirm_password {
        errors.insert("confirmPassword", "Passwords do not match".into());
    }
    errors
}

pub fn validate_post(draft: &PostDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "title", &draft.title, "Title is required");
    require(&mut errors, "excerpt", &draft.excerpt, "Excerpt is required");
    require(&mut errors, "content", &draft.content, "Content is required");
    require(&mut errors, "category", &draft.category, "Category is required");
    errors
}

/// News and trending items
pub fn validate_feed_item(draft: &FeedItemDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "title", &draft.title, "Title is required");
    require(&mut errors, "summary", &draft.summary, "Summary is required");
    require(&mut errors, "source", &draft.source, "Source is required");
    errors
}

pub fn validate_contact(draft: &ContactDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", &draft.name, "Name is required");
    check_email(&mut errors, &draft.email);
    if draft.message.trim().is_empty() {
        errors.insert("message", "Message is required".into());
    } else if draft.message.chars().count() < MIN_MESSAGE_LEN {
        errors.insert(
            "message",
            format!("Message must be at least {MIN_MESSAGE_LEN} characters"),
        );
    }
    errors
}

/// Password is optional on update, but must meet the length rule when given
pub fn validate_user_update(update: &UserUpdate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", &update.name, "Name is required");
    check_email(&mut errors, &update.email);
    if let Some(password) = update.password.as_deref().filter(|p| !p.is_empty()) {
        check_password(&mut errors, password);
    }
    errors
}

/// Join field errors into one line, in field order
pub fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}
