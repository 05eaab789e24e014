use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::SiteAuthApi,
    error::SiteAuthError,
    model::{
        EmailSignIn, EmailSignUp, NewContact, PhoneFlow, PhoneVerification, SignedIn,
        SocialProvider,
    },
};
use crate::domain::service::Service;

/// Local implementation of the SiteAuthApi trait that delegates to the domain service
pub struct SiteAuthLocalClient {
    service: Arc<Service>,
}

impl SiteAuthLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SiteAuthApi for SiteAuthLocalClient {
    async fn sign_in_with_email(&self, form: EmailSignIn) -> Result<SignedIn, SiteAuthError> {
        self.service.sign_in_with_email(form).await.map_err(Into::into)
    }

    async fn sign_up_with_email(&self, form: EmailSignUp) -> Result<SignedIn, SiteAuthError> {
        self.service.sign_up_with_email(form).await.map_err(Into::into)
    }

    async fn sign_in_with_social(
        &self,
        provider: SocialProvider,
    ) -> Result<SignedIn, SiteAuthError> {
        self.service
            .sign_in_with_social(provider)
            .await
            .map_err(Into::into)
    }

    async fn request_phone_code(
        &self,
        flow: PhoneFlow,
        phone_number: &str,
    ) -> Result<(), SiteAuthError> {
        self.service
            .request_phone_code(flow, phone_number)
            .await
            .map_err(Into::into)
    }

    async fn verify_phone_code(
        &self,
        flow: PhoneFlow,
        verification: PhoneVerification,
    ) -> Result<SignedIn, SiteAuthError> {
        self.service
            .verify_phone_code(flow, verification)
            .await
            .map_err(Into::into)
    }

    async fn sign_out(&self) -> Result<(), SiteAuthError> {
        self.service.sign_out().await.map_err(Into::into)
    }

    async fn submit_contact(&self, form: NewContact) -> Result<String, SiteAuthError> {
        self.service.submit_contact(form).await.map_err(Into::into)
    }
}
