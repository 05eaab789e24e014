use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::contract::model::{Identity, PopupRequest, VerificationHandle};

/// Error codes the identity backend reports on rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    UserDisabled,
    TooManyRequests,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    PopupClosedByUser,
    PopupBlocked,
    AccountExistsWithDifferentCredential,
    InvalidPhoneNumber,
    InvalidVerificationCode,
    InvalidVerificationId,
    Other(String),
}

impl ProviderErrorCode {
    /// Parse a backend code such as `auth/wrong-password`; the `auth/` prefix is optional.
    pub fn from_code(code: &str) -> Self {
        let bare = code.strip_prefix("auth/").unwrap_or(code);
        match bare {
            "user-not-found" => Self::UserNotFound,
            "wrong-password" => Self::WrongPassword,
            "invalid-email" => Self::InvalidEmail,
            "user-disabled" => Self::UserDisabled,
            "too-many-requests" => Self::TooManyRequests,
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "weak-password" => Self::WeakPassword,
            "operation-not-allowed" => Self::OperationNotAllowed,
            "popup-closed-by-user" => Self::PopupClosedByUser,
            "popup-blocked" => Self::PopupBlocked,
            "account-exists-with-different-credential" => {
                Self::AccountExistsWithDifferentCredential
            }
            "invalid-phone-number" => Self::InvalidPhoneNumber,
            "invalid-verification-code" => Self::InvalidVerificationCode,
            "invalid-verification-id" => Self::InvalidVerificationId,
            _ => Self::Other(bare.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserNotFound => "user-not-found",
            Self::WrongPassword => "wrong-password",
            Self::InvalidEmail => "invalid-email",
            Self::UserDisabled => "user-disabled",
            Self::TooManyRequests => "too-many-requests",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::WeakPassword => "weak-password",
            Self::OperationNotAllowed => "operation-not-allowed",
            Self::PopupClosedByUser => "popup-closed-by-user",
            Self::PopupBlocked => "popup-blocked",
            Self::AccountExistsWithDifferentCredential => {
                "account-exists-with-different-credential"
            }
            Self::InvalidPhoneNumber => "invalid-phone-number",
            Self::InvalidVerificationCode => "invalid-verification-code",
            Self::InvalidVerificationId => "invalid-verification-id",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth/{}", self.as_str())
    }
}

/// Failure reported across the identity-provider boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("identity provider rejected the request: {0}")]
    Rejected(ProviderErrorCode),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn rejected(code: ProviderErrorCode) -> Self {
        Self::Rejected(code)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn code(&self) -> Option<&ProviderErrorCode> {
        match self {
            Self::Rejected(code) => Some(code),
            Self::Unavailable(_) => None,
        }
    }
}

/// Capability interface of the hosted identity backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Stream of "current signed-in identity" changes. The receiver starts
    /// with the identity known at subscription time.
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>>;

    fn current_identity(&self) -> Option<Identity>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError>;

    async fn create_account_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError>;

    async fn sign_in_with_popup(&self, request: &PopupRequest)
        -> Result<Identity, ProviderError>;

    /// Send an OTP to `phone_number` (E.164, leading `+`).
    async fn sign_in_with_phone(
        &self,
        phone_number: &str,
    ) -> Result<VerificationHandle, ProviderError>;

    async fn confirm_phone(
        &self,
        handle: &VerificationHandle,
        code: &str,
    ) -> Result<Identity, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;
}
