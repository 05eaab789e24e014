use std::fmt;

use thiserror::Error;

use crate::contract::model::{PhoneFlow, SocialProvider};
use crate::domain::messages;
use crate::domain::ports::{ProviderError, ProviderErrorCode};
use crate::domain::validation::ValidationError;

/// User-triggered operation an error belongs to; selects the message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFlow {
    EmailSignIn,
    EmailSignUp,
    Social(SocialProvider),
    PhoneRequest(PhoneFlow),
    PhoneVerify(PhoneFlow),
    SignOut,
    Contact,
}

impl fmt::Display for AuthFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailSignIn => f.write_str("email sign-in"),
            Self::EmailSignUp => f.write_str("email sign-up"),
            Self::Social(p) => write!(f, "{p} sign-in"),
            Self::PhoneRequest(p) => write!(f, "{p} code request"),
            Self::PhoneVerify(p) => write!(f, "{p} verification"),
            Self::SignOut => f.write_str("sign-out"),
            Self::Contact => f.write_str("contact submission"),
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{flow} rejected: {code}")]
    Rejected {
        flow: AuthFlow,
        code: ProviderErrorCode,
    },

    #[error("{flow} failed: {message}")]
    Unavailable { flow: AuthFlow, message: String },

    #[error("No verification pending for {flow}")]
    NoPendingVerification { flow: PhoneFlow },
}

impl DomainError {
    pub fn rejected(flow: AuthFlow, code: ProviderErrorCode) -> Self {
        Self::Rejected { flow, code }
    }

    pub fn unavailable(flow: AuthFlow, message: impl fmt::Display) -> Self {
        Self::Unavailable {
            flow,
            message: message.to_string(),
        }
    }

    pub fn no_pending_verification(flow: PhoneFlow) -> Self {
        Self::NoPendingVerification { flow }
    }

    /// Wrap a provider failure raised during `flow`.
    pub fn provider(flow: AuthFlow, err: ProviderError) -> Self {
        match err {
            ProviderError::Rejected(code) => Self::rejected(flow, code),
            ProviderError::Unavailable(message) => Self::Unavailable { flow, message },
        }
    }

    /// The single blocking message shown for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(v) => v.to_string(),
            Self::Rejected { flow, code } => messages::rejection(*flow, code),
            Self::Unavailable { flow, .. } => messages::fallback(*flow),
            Self::NoPendingVerification { .. } => messages::NO_PENDING_VERIFICATION.to_string(),
        }
    }
}
