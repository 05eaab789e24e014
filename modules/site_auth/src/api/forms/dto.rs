//! Raw form input keyed by element id, and its conversion into contract models.

use std::collections::HashMap;

use crate::contract::model::{
    EmailSignIn, EmailSignUp, NewContact, PhoneFlow, PhoneVerification,
};

/// Element ids the page exposes.
pub mod ids {
    pub const LOGIN_EMAIL: &str = "loginEmail";
    pub const LOGIN_PASSWORD: &str = "loginPassword";

    pub const SIGNUP_NAME: &str = "signupName";
    pub const SIGNUP_EMAIL: &str = "signupEmail";
    pub const SIGNUP_PASSWORD: &str = "signupPassword";
    pub const CONFIRM_PASSWORD: &str = "confirmPassword";
    pub const AGREE_TERMS: &str = "agreeTerms";

    pub const LOGIN_PHONE: &str = "loginPhone";
    pub const PHONE_CODE: &str = "phoneCode";
    pub const SIGNUP_PHONE: &str = "signupPhone";
    pub const PHONE_SIGNUP_CODE: &str = "phoneSignupCode";
    pub const SIGNUP_PHONE_NAME: &str = "signupPhoneName";

    pub const CONTACT_NAME: &str = "name";
    pub const CONTACT_EMAIL: &str = "email";
    pub const CONTACT_SUBJECT: &str = "subject";
    pub const CONTACT_MESSAGE: &str = "message";
}

/// Values of one form's inputs. Missing elements read as empty.
#[derive(Debug, Clone, Default)]
pub struct FieldValues(HashMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: impl Into<String>) -> Self {
        self.0.insert(id.to_string(), value.into());
        self
    }

    pub fn text(&self, id: &str) -> String {
        self.0.get(id).cloned().unwrap_or_default()
    }

    /// Checkbox state; browsers submit `on` for a checked box.
    pub fn checked(&self, id: &str) -> bool {
        matches!(self.0.get(id).map(String::as_str), Some("on" | "true" | "1"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&FieldValues> for EmailSignIn {
    fn from(f: &FieldValues) -> Self {
        Self {
            email: f.text(ids::LOGIN_EMAIL),
            password: f.text(ids::LOGIN_PASSWORD),
        }
    }
}

impl From<&FieldValues> for EmailSignUp {
    fn from(f: &FieldValues) -> Self {
        Self {
            name: f.text(ids::SIGNUP_NAME),
            email: f.text(ids::SIGNUP_EMAIL),
            password: f.text(ids::SIGNUP_PASSWORD),
            confirm_password: f.text(ids::CONFIRM_PASSWORD),
            accepted_terms: f.checked(ids::AGREE_TERMS),
        }
    }
}

impl From<&FieldValues> for NewContact {
    fn from(f: &FieldValues) -> Self {
        Self {
            name: f.text(ids::CONTACT_NAME),
            email: f.text(ids::CONTACT_EMAIL),
            subject: f.text(ids::CONTACT_SUBJECT),
            message: f.text(ids::CONTACT_MESSAGE),
        }
    }
}

pub fn phone_number(flow: PhoneFlow, f: &FieldValues) -> String {
    match flow {
        PhoneFlow::SignIn => f.text(ids::LOGIN_PHONE),
        PhoneFlow::SignUp => f.text(ids::SIGNUP_PHONE),
    }
}

pub fn phone_verification(flow: PhoneFlow, f: &FieldValues) -> PhoneVerification {
    match flow {
        PhoneFlow::SignIn => PhoneVerification {
            code: f.text(ids::PHONE_CODE),
            name: None,
        },
        PhoneFlow::SignUp => PhoneVerification {
            code: f.text(ids::PHONE_SIGNUP_CODE),
            name: Some(f.text(ids::SIGNUP_PHONE_NAME)),
        },
    }
}
