use thiserror::Error;

use crate::domain::error::DomainError;

/// Errors that are safe to expose to other modules. Each carries the text
/// the page would show for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiteAuthError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("Unavailable: {message}")]
    Unavailable { message: String },
}

impl SiteAuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Rejected { message, .. }
            | Self::Unavailable { message } => message,
        }
    }
}

impl From<DomainError> for SiteAuthError {
    fn from(domain_error: DomainError) -> Self {
        let message = domain_error.user_message();
        match domain_error {
            DomainError::Validation(_) | DomainError::NoPendingVerification { .. } => {
                Self::validation(message)
            }
            DomainError::Rejected { code, .. } => Self::rejected(code.to_string(), message),
            DomainError::Unavailable { .. } => Self::unavailable(message),
        }
    }
}
