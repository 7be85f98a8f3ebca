//! Client-side signup rules.
//!
//! Every rule is checked and every violation reported, so a form can mark
//! all offending fields at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ApiError;
use crate::types::RegistrationRequest;

pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 128;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A rule violation scoped to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl RegistrationRequest {
    /// Check every field, returning all violations found.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > NAME_MAX_CHARS {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !EMAIL_RE.is_match(email) {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    let len = password.chars().count();
    if len < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN_CHARS} characters"),
        ));
    } else if len > PASSWORD_MAX_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at most {PASSWORD_MAX_CHARS} characters"),
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        errors.push(FieldError::new(
            "password",
            "Password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push(FieldError::new(
            "password",
            "Password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new("password", "Password must contain a digit"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: ApiError) -> Vec<String> {
        err.field_errors().iter().map(|e| e.field.clone()).collect()
    }

    #[test]
    fn valid_registration_passes() {
        RegistrationRequest::new("B", "b@c.com", "Secret123!")
            .validate()
            .unwrap();
    }

    #[test]
    fn empty_form_reports_every_field() {
        let err = RegistrationRequest::new("", "", "").validate().unwrap_err();
        let fields = fields(err);
        assert!(fields.contains(&"name".to_string()));
        assert!(fields.contains(&"email".to_string()));
        assert!(fields.contains(&"password".to_string()));
    }

    #[test]
    fn whitespace_name_is_missing() {
        let err = RegistrationRequest::new("   ", "b@c.com", "Secret123")
            .validate()
            .unwrap_err();
        assert_eq!(err.field_errors(), &[FieldError::new("name", "Name is required")]);
    }

    #[test]
    fn long_name_is_rejected() {
        let name = "x".repeat(NAME_MAX_CHARS + 1);
        let err = RegistrationRequest::new(name, "b@c.com", "Secret123")
            .validate()
            .unwrap_err();
        assert_eq!(fields(err), vec!["name"]);
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["plain", "a@b", "a b@c.com", "@c.com", "a@@c.com"] {
            let err = RegistrationRequest::new("B", email, "Secret123")
                .validate()
                .unwrap_err();
            assert_eq!(fields(err), vec!["email"], "{email}");
        }
    }

    #[test]
    fn password_character_classes_are_checked() {
        let err = RegistrationRequest::new("B", "b@c.com", "alllowercase")
            .validate()
            .unwrap_err();
        let messages: Vec<_> = err.field_errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Password must contain an uppercase letter",
                "Password must contain a digit"
            ]
        );
    }

    #[test]
    fn short_password_is_rejected() {
        let err = RegistrationRequest::new("B", "b@c.com", "Ab1")
            .validate()
            .unwrap_err();
        assert_eq!(
            err.field_errors(),
            &[FieldError::new("password", "Password must be at least 8 characters")]
        );
    }
}
