use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed-in identity as issued by the external identity provider.
///
/// This crate never creates or destroys identities, it only observes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: Option<String>,
}

impl Identity {
    /// Text shown for an identity that has no profile document yet.
    pub fn fallback_label(&self) -> String {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.phone.as_deref())
            .unwrap_or("User")
            .to_string()
    }
}

/// Sign-in method that produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    Password,
    Google,
    Apple,
    Phone,
}

/// Per-user profile document, keyed by `Identity::uid`.
///
/// Timestamps are `None` while the store has not resolved its server
/// timestamp yet (the first snapshot after a write).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderTag>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Name if present, otherwise the stored email.
    pub fn display_label(&self) -> Option<&str> {
        [self.name.as_str(), self.email.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
    }
}

/// Profile fields known before the first write; timestamps come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub provider: Option<ProviderTag>,
}

/// Stored contact-form submission. Written once, never read back by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailSignIn {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailSignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

/// Second step of a phone flow: the code typed by the user and, for sign-up,
/// the name entered next to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneVerification {
    pub code: String,
    pub name: Option<String>,
}

/// Popup-based federated sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialProvider {
    Google,
    Apple,
}

impl SocialProvider {
    pub fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Apple => "Apple",
        }
    }

    pub fn tag(self) -> ProviderTag {
        match self {
            Self::Google => ProviderTag::Google,
            Self::Apple => ProviderTag::Apple,
        }
    }

    /// Provider id understood by the identity backend.
    pub fn provider_id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Apple => "apple.com",
        }
    }

    /// Extra popup parameters sent with the sign-in request.
    pub fn custom_parameters(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Google => &[("prompt", "select_account")],
            Self::Apple => &[],
        }
    }

    pub fn popup_request(self) -> PopupRequest {
        PopupRequest {
            provider: self,
            provider_id: self.provider_id().to_string(),
            custom_parameters: self
                .custom_parameters()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Popup sign-in as the identity backend receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRequest {
    pub provider: SocialProvider,
    pub provider_id: String,
    pub custom_parameters: BTreeMap<String, String>,
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phone sign-in and phone sign-up keep independent verification handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneFlow {
    SignIn,
    SignUp,
}

impl fmt::Display for PhoneFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignIn => f.write_str("phone sign-in"),
            Self::SignUp => f.write_str("phone sign-up"),
        }
    }
}

/// Opaque token correlating an OTP request with its confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerificationHandle(String);

impl VerificationHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a completed credential flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub uid: String,
    pub display_name: String,
    pub profile_created: bool,
}

/// What the header shows for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    SignedOut,
    SignedIn { display_name: String },
}
