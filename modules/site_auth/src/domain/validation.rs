//! Synchronous form checks run before any provider call.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::contract::model::{EmailSignIn, EmailSignUp, NewContact};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Local validation failures. The display text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please agree to the Terms & Conditions")]
    TermsNotAccepted,

    #[error("Please enter a phone number")]
    MissingPhoneNumber,

    #[error("Please enter a valid {len}-digit code")]
    InvalidCode { len: usize },
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_sign_in(form: &EmailSignIn) -> Result<(), ValidationError> {
    if blank(&form.email) || form.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&form.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Checks run in the order the page reports them: presence, password
/// length, confirmation, email syntax, terms.
pub fn validate_sign_up(form: &EmailSignUp, min_password_len: usize) -> Result<(), ValidationError> {
    if blank(&form.name)
        || blank(&form.email)
        || form.password.is_empty()
        || form.confirm_password.is_empty()
    {
        return Err(ValidationError::MissingFields);
    }
    if form.password.chars().count() < min_password_len {
        return Err(ValidationError::PasswordTooShort {
            min: min_password_len,
        });
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if !is_valid_email(&form.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !form.accepted_terms {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}

pub fn validate_contact(form: &NewContact) -> Result<(), ValidationError> {
    if [&form.name, &form.email, &form.subject, &form.message]
        .into_iter()
        .any(|f| blank(f))
    {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&form.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Returns the number in E.164 form, prepending `prefix` when the user left it out.
pub fn normalize_phone(raw: &str, prefix: &str) -> Result<String, ValidationError> {
    let number = raw.trim();
    if number.is_empty() {
        return Err(ValidationError::MissingPhoneNumber);
    }
    if number.starts_with(prefix) {
        Ok(number.to_string())
    } else {
        Ok(format!("{prefix}{number}"))
    }
}

pub fn validate_code(code: &str, len: usize) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.chars().count() != len || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCode { len });
    }
    Ok(())
}
