//! User-facing texts: provider error codes per flow, per-flow fallbacks and
//! success notices.

use crate::contract::model::PhoneFlow;
use crate::domain::error::AuthFlow;
use crate::domain::ports::ProviderErrorCode;

pub const NO_PENDING_VERIFICATION: &str =
    "Please request a verification code first.";
pub const CODE_SENT: &str = "Verification code sent to your phone";
pub const PHONE_VERIFIED: &str = "Phone verified successfully!";
pub const SIGNED_OUT: &str = "You have been logged out successfully.";

/// Text for a provider rejection; codes without a specific entry for `flow`
/// get the flow's generic message.
pub fn rejection(flow: AuthFlow, code: &ProviderErrorCode) -> String {
    use ProviderErrorCode::*;

    let specific = match (flow, code) {
        (AuthFlow::EmailSignIn, UserNotFound) => {
            Some("No account found with this email. Please sign up.")
        }
        (AuthFlow::EmailSignIn, WrongPassword) => Some("Incorrect password. Please try again."),
        (AuthFlow::EmailSignIn, UserDisabled) => Some("This account has been disabled."),
        (AuthFlow::EmailSignIn, TooManyRequests) => {
            Some("Too many failed attempts. Please try again later.")
        }
        (AuthFlow::EmailSignIn | AuthFlow::EmailSignUp, InvalidEmail) => {
            Some("Invalid email address.")
        }
        (AuthFlow::EmailSignUp, EmailAlreadyInUse) => {
            Some("An account with this email already exists. Please log in instead.")
        }
        (AuthFlow::EmailSignUp, WeakPassword) => {
            Some("Password is too weak. Please choose a stronger password.")
        }
        (AuthFlow::EmailSignUp, OperationNotAllowed) => {
            Some("Email/password accounts are not enabled. Please contact support.")
        }
        (AuthFlow::Social(_), PopupClosedByUser) => {
            Some("Sign-in popup was closed. Please try again.")
        }
        (AuthFlow::Social(_), AccountExistsWithDifferentCredential) => {
            Some("An account already exists with a different sign-in method.")
        }
        (AuthFlow::Social(_), PopupBlocked) => {
            Some("Popup was blocked by your browser. Please allow popups and try again.")
        }
        (AuthFlow::PhoneRequest(_), InvalidPhoneNumber) => {
            Some("Invalid phone number format. Please include country code.")
        }
        (AuthFlow::PhoneRequest(_), TooManyRequests) => {
            Some("Too many requests. Please try again later.")
        }
        _ => None,
    };

    specific.map_or_else(|| fallback(flow), str::to_string)
}

/// Generic per-flow message for unmapped codes and transport failures.
pub fn fallback(flow: AuthFlow) -> String {
    match flow {
        AuthFlow::EmailSignIn => "Failed to log in. Please try again.".to_string(),
        AuthFlow::EmailSignUp => "Failed to create account. Please try again.".to_string(),
        AuthFlow::Social(provider) => {
            format!("Failed to sign in with {provider}. Please try again.")
        }
        AuthFlow::PhoneRequest(_) => {
            "Failed to send verification code. Please try again.".to_string()
        }
        AuthFlow::PhoneVerify(_) => "Invalid verification code. Please try again.".to_string(),
        AuthFlow::SignOut => "Failed to log out. Please try again.".to_string(),
        AuthFlow::Contact => "Failed to send message. Please try again later.".to_string(),
    }
}

pub fn welcome_back(name: &str) -> String {
    format!("Welcome back, {name}!")
}

pub fn account_created(name: &str) -> String {
    format!("Welcome, {name}! Your account has been created successfully.")
}

pub fn social_account_created(name: &str) -> String {
    format!("Welcome, {name}! Your account has been created.")
}

pub fn phone_verified(flow: PhoneFlow, name: &str) -> String {
    match flow {
        PhoneFlow::SignIn => PHONE_VERIFIED.to_string(),
        PhoneFlow::SignUp => account_created(name),
    }
}

pub fn contact_received(name: &str, email: &str) -> String {
    format!(
        "Thank you, {name}! Your message has been received. We'll get back to you soon at {email}."
    )
}
