use async_trait::async_trait;

use crate::contract::{
    error::SiteAuthError,
    model::{EmailSignIn, EmailSignUp, NewContact, PhoneFlow, PhoneVerification, SignedIn, SocialProvider},
};

/// Public API trait for the site_auth module that other modules can use
#[async_trait]
pub trait SiteAuthApi: Send + Sync {
    async fn sign_in_with_email(&self, form: EmailSignIn) -> Result<SignedIn, SiteAuthError>;

    async fn sign_up_with_email(&self, form: EmailSignUp) -> Result<SignedIn, SiteAuthError>;

    async fn sign_in_with_social(&self, provider: SocialProvider)
        -> Result<SignedIn, SiteAuthError>;

    /// Send a one-time code; the handle stays inside the module.
    async fn request_phone_code(
        &self,
        flow: PhoneFlow,
        phone_number: &str,
    ) -> Result<(), SiteAuthError>;

    async fn verify_phone_code(
        &self,
        flow: PhoneFlow,
        verification: PhoneVerification,
    ) -> Result<SignedIn, SiteAuthError>;

    async fn sign_out(&self) -> Result<(), SiteAuthError>;

    /// Store a contact-form submission and return its id.
    async fn submit_contact(&self, form: NewContact) -> Result<String, SiteAuthError>;
}
