//! Identity field rules.
//!
//! Each rule reports [`FieldError`]s instead of failing fast so callers can
//! return every violation of a request at once.
//!
//! - Username: 1-256 characters from `A-Z a-z 0-9 - . _ @ +`
//! - Email: RFC 5322 shaped, at most 256 characters
//! - Name and surname: at most 64 characters
//! - Phone number: at most 16 characters when present
//! - Password: length and character classes per [`IdentityConfig`]

use std::sync::LazyLock;

use roster_core::error::FieldError;

use crate::config::IdentityConfig;

static USERNAME_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9._@+-]+$").expect("USERNAME_REGEX is a valid regex pattern")
});

static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$"
    ).expect("EMAIL_REGEX is a valid regex pattern")
});

pub const MAX_USERNAME_LENGTH: usize = 256;
pub const MAX_EMAIL_LENGTH: usize = 256;
pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_SURNAME_LENGTH: usize = 64;
pub const MAX_PHONE_NUMBER_LENGTH: usize = 16;

pub fn validate_username(username: &str) -> Result<(), FieldError> {
    if username.is_empty() {
        return Err(FieldError::new(
            "username",
            "required",
            "Username is required",
        ));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(FieldError::new(
            "username",
            "too_long",
            format!("Username must not exceed {MAX_USERNAME_LENGTH} characters"),
        ));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(FieldError::new(
            "username",
            "invalid_format",
            "Username can only contain letters, digits and - . _ @ +",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::new("email", "required", "Email is required"));
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(FieldError::new(
            "email",
            "too_long",
            format!("Email must not exceed {MAX_EMAIL_LENGTH} characters"),
        ));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(FieldError::new(
            "email",
            "invalid_format",
            "Email address is not valid",
        ));
    }
    Ok(())
}

fn max_length(field: &str, label: &str, value: &str, max: usize) -> Option<FieldError> {
    (value.chars().count() > max).then(|| {
        FieldError::new(
            field,
            "too_long",
            format!("{label} must not exceed {max} characters"),
        )
    })
}

/// Length rules for the free-form profile fields.
pub fn validate_profile(name: &str, surname: &str, phone_number: Option<&str>) -> Vec<FieldError> {
    let mut errors = Vec::new();
    errors.extend(max_length("name", "Name", name, MAX_NAME_LENGTH));
    errors.extend(max_length("surname", "Surname", surname, MAX_SURNAME_LENGTH));
    if let Some(phone) = phone_number {
        errors.extend(max_length(
            "phone_number",
            "Phone number",
            phone,
            MAX_PHONE_NUMBER_LENGTH,
        ));
    }
    errors
}

/// Every password policy rule the candidate breaks.
pub fn validate_password(password: &str, config: &IdentityConfig) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let length = password.chars().count();

    if length < config.min_password_length {
        errors.push(FieldError::new(
            "password",
            "too_short",
            format!(
                "Password must be at least {} characters",
                config.min_password_length
            ),
        ));
    }
    if length > config.max_password_length {
        errors.push(FieldError::new(
            "password",
            "too_long",
            format!(
                "Password must not exceed {} characters",
                config.max_password_length
            ),
        ));
    }
    if config.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "requires_digit",
            "Password must contain a digit",
        ));
    }
    if config.require_lowercase && !password.chars().any(char::is_lowercase) {
        errors.push(FieldError::new(
            "password",
            "requires_lowercase",
            "Password must contain a lowercase letter",
        ));
    }
    if config.require_uppercase && !password.chars().any(char::is_uppercase) {
        errors.push(FieldError::new(
            "password",
            "requires_uppercase",
            "Password must contain an uppercase letter",
        ));
    }
    if config.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
        errors.push(FieldError::new(
            "password",
            "requires_non_alphanumeric",
            "Password must contain a non-alphanumeric character",
        ));
    }

    errors
}
