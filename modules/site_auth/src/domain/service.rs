use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{
    EmailSignIn, EmailSignUp, Identity, NewContact, NewProfile, PhoneFlow, PhoneVerification,
    ProviderTag, SignedIn, SocialProvider, UserProfile, VerificationHandle,
};
use crate::domain::error::{AuthFlow, DomainError};
use crate::domain::ports::IdentityProvider;
use crate::domain::repo::{ContactsRepository, ProfilesRepository};
use crate::domain::validation;

/// Fallback profile name when the identity carries nothing better.
const DEFAULT_NAME: &str = "User";

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_length: usize,
    pub verification_code_length: usize,
    pub phone_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            verification_code_length: 6,
            phone_prefix: "+".to_string(),
        }
    }
}

/// Pending OTP handles, one per phone flow. A new request overwrites the
/// previous handle; a successful confirmation consumes it.
#[derive(Default)]
pub struct PhoneVerifications {
    pending: Mutex<HashMap<PhoneFlow, VerificationHandle>>,
}

impl PhoneVerifications {
    pub fn store(&self, flow: PhoneFlow, handle: VerificationHandle) {
        if let Some(previous) = self.pending.lock().insert(flow, handle) {
            debug!(%flow, previous = previous.as_str(), "replaced pending verification");
        }
    }

    pub fn current(&self, flow: PhoneFlow) -> Option<VerificationHandle> {
        self.pending.lock().get(&flow).cloned()
    }

    /// Remove the handle for `flow` if it is still `handle`.
    pub fn consume(&self, flow: PhoneFlow, handle: &VerificationHandle) {
        let mut pending = self.pending.lock();
        if pending.get(&flow) == Some(handle) {
            pending.remove(&flow);
        }
    }
}

/// Whether `ensure_profile` wrote a new document.
enum Provisioned {
    Created(NewProfile),
    Existing(UserProfile),
}

impl Provisioned {
    fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Created(p) => Some(p.name.as_str()).filter(|n| !n.trim().is_empty()),
            Self::Existing(p) => p.display_label(),
        }
    }
}

/// Credential flows and the contact form.
/// Depends only on ports, not on a concrete backend.
pub struct Service {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfilesRepository>,
    contacts: Arc<dyn ContactsRepository>,
    verifications: PhoneVerifications,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfilesRepository>,
        contacts: Arc<dyn ContactsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            identity,
            profiles,
            contacts,
            verifications: PhoneVerifications::default(),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn pending_verification(&self, flow: PhoneFlow) -> Option<VerificationHandle> {
        self.verifications.current(flow)
    }

    #[instrument(name = "site_auth.service.sign_in_with_email", skip(self, form), fields(email = %form.email))]
    pub async fn sign_in_with_email(&self, form: EmailSignIn) -> Result<SignedIn, DomainError> {
        validation::validate_sign_in(&form)?;
        let flow = AuthFlow::EmailSignIn;

        let identity = self
            .identity
            .sign_in_with_password(&form.email, &form.password)
            .await
            .map_err(|e| DomainError::provider(flow, e))?;

        let profile = NewProfile {
            name: local_part(identity.email.as_deref().unwrap_or(&form.email)),
            email: identity.email.clone().unwrap_or(form.email),
            phone: None,
            provider: Some(ProviderTag::Password),
        };
        let provisioned = self.ensure_profile(flow, &identity, profile).await?;
        info!(uid = %identity.uid, "signed in with email");

        // Greeted by the stored name; a profile provisioned just now is greeted by email.
        let display_name = match &provisioned {
            Provisioned::Existing(current) => current.display_label().map(str::to_string),
            Provisioned::Created(_) => None,
        }
        .unwrap_or_else(|| identity.fallback_label());
        Ok(SignedIn {
            uid: identity.uid,
            display_name,
            profile_created: provisioned.created(),
        })
    }

    #[instrument(name = "site_auth.service.sign_up_with_email", skip(self, form), fields(email = %form.email))]
    pub async fn sign_up_with_email(&self, form: EmailSignUp) -> Result<SignedIn, DomainError> {
        validation::validate_sign_up(&form, self.config.min_password_length)?;
        let flow = AuthFlow::EmailSignUp;

        let identity = self
            .identity
            .create_account_with_password(&form.email, &form.password)
            .await
            .map_err(|e| DomainError::provider(flow, e))?;

        let name = form.name.trim().to_string();
        let profile = NewProfile {
            name: name.clone(),
            email: form.email,
            phone: None,
            provider: Some(ProviderTag::Password),
        };
        self.profiles
            .create(&identity.uid, profile, true)
            .await
            .map_err(|e| DomainError::unavailable(flow, e))?;

        info!(uid = %identity.uid, "account created");
        Ok(SignedIn {
            uid: identity.uid,
            display_name: name,
            profile_created: true,
        })
    }

    #[instrument(name = "site_auth.service.sign_in_with_social", skip(self))]
    pub async fn sign_in_with_social(
        &self,
        provider: SocialProvider,
    ) -> Result<SignedIn, DomainError> {
        let flow = AuthFlow::Social(provider);

        let identity = self
            .identity
            .sign_in_with_popup(&provider.popup_request())
            .await
            .map_err(|e| DomainError::provider(flow, e))?;

        let name = identity
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| identity.email.as_deref().map(local_part))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let profile = NewProfile {
            name,
            email: identity.email.clone().unwrap_or_default(),
            phone: None,
            provider: Some(provider.tag()),
        };
        let provisioned = self.ensure_profile(flow, &identity, profile).await?;
        info!(uid = %identity.uid, "signed in with {provider}");
        Ok(signed_in(&identity, &provisioned))
    }

    /// First phone step: send a code and remember the handle for `flow`.
    #[instrument(name = "site_auth.service.request_phone_code", skip(self, phone_number))]
    pub async fn request_phone_code(
        &self,
        flow: PhoneFlow,
        phone_number: &str,
    ) -> Result<(), DomainError> {
        let number = validation::normalize_phone(phone_number, &self.config.phone_prefix)?;

        let handle = self
            .identity
            .sign_in_with_phone(&number)
            .await
            .map_err(|e| DomainError::provider(AuthFlow::PhoneRequest(flow), e))?;

        self.verifications.store(flow, handle);
        info!("verification code sent");
        Ok(())
    }

    /// Second phone step: confirm the code against the handle stored for `flow`.
    #[instrument(name = "site_auth.service.verify_phone_code", skip(self, verification))]
    pub async fn verify_phone_code(
        &self,
        flow: PhoneFlow,
        verification: PhoneVerification,
    ) -> Result<SignedIn, DomainError> {
        validation::validate_code(&verification.code, self.config.verification_code_length)?;
        let auth_flow = AuthFlow::PhoneVerify(flow);

        let handle = self
            .verifications
            .current(flow)
            .ok_or_else(|| DomainError::no_pending_verification(flow))?;

        let identity = self
            .identity
            .confirm_phone(&handle, verification.code.trim())
            .await
            .map_err(|e| DomainError::provider(auth_flow, e))?;
        self.verifications.consume(flow, &handle);

        let typed_name = match flow {
            PhoneFlow::SignUp => verification.name.filter(|n| !n.trim().is_empty()),
            PhoneFlow::SignIn => None,
        };
        let name = typed_name
            .or_else(|| identity.display_name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let profile = NewProfile {
            name: name.trim().to_string(),
            email: identity.email.clone().unwrap_or_default(),
            phone: identity.phone.clone(),
            provider: Some(ProviderTag::Phone),
        };
        let provisioned = self.ensure_profile(auth_flow, &identity, profile).await?;
        info!(uid = %identity.uid, "phone verified");
        Ok(signed_in(&identity, &provisioned))
    }

    #[instrument(name = "site_auth.service.sign_out", skip(self))]
    pub async fn sign_out(&self) -> Result<(), DomainError> {
        self.identity
            .sign_out()
            .await
            .map_err(|e| DomainError::provider(AuthFlow::SignOut, e))?;
        info!("signed out");
        Ok(())
    }

    #[instrument(name = "site_auth.service.submit_contact", skip(self, form), fields(email = %form.email))]
    pub async fn submit_contact(&self, form: NewContact) -> Result<String, DomainError> {
        validation::validate_contact(&form)?;
        let id = self
            .contacts
            .add(form)
            .await
            .map_err(|e| DomainError::unavailable(AuthFlow::Contact, e))?;
        info!(submission_id = %id, "contact submission stored");
        Ok(id)
    }

    /// Create the profile if it is missing, otherwise bump `updatedAt`.
    /// Existing profiles keep their provider and creation metadata.
    async fn ensure_profile(
        &self,
        flow: AuthFlow,
        identity: &Identity,
        profile: NewProfile,
    ) -> Result<Provisioned, DomainError> {
        let existing = self
            .profiles
            .find(&identity.uid)
            .await
            .map_err(|e| DomainError::unavailable(flow, e))?;

        match existing {
            Some(current) => {
                self.profiles
                    .touch(&identity.uid)
                    .await
                    .map_err(|e| DomainError::unavailable(flow, e))?;
                debug!("profile exists; updatedAt touched");
                Ok(Provisioned::Existing(current))
            }
            None => {
                if profile.name.trim().is_empty() {
                    warn!("creating profile with empty name");
                }
                self.profiles
                    .create(&identity.uid, profile.clone(), false)
                    .await
                    .map_err(|e| DomainError::unavailable(flow, e))?;
                debug!("profile created");
                Ok(Provisioned::Created(profile))
            }
        }
    }
}

fn signed_in(identity: &Identity, provisioned: &Provisioned) -> SignedIn {
    SignedIn {
        uid: identity.uid.clone(),
        display_name: provisioned
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| identity.fallback_label()),
        profile_created: provisioned.created(),
    }
}

/// `ada@example.com` -> `ada`.
fn local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_part_of_email() {
        assert_eq!(local_part("ada@example.com"), "ada");
        assert_eq!(local_part("plain"), "plain");
    }

    #[test]
    fn new_request_overwrites_handle() {
        let v = PhoneVerifications::default();
        v.store(PhoneFlow::SignIn, VerificationHandle::new("h1"));
        v.store(PhoneFlow::SignIn, VerificationHandle::new("h2"));
        v.store(PhoneFlow::SignUp, VerificationHandle::new("s1"));
        assert_eq!(
            v.current(PhoneFlow::SignIn),
            Some(VerificationHandle::new("h2"))
        );

        v.consume(PhoneFlow::SignIn, &VerificationHandle::new("h1"));
        assert!(v.current(PhoneFlow::SignIn).is_some());
        v.consume(PhoneFlow::SignIn, &VerificationHandle::new("h2"));
        assert!(v.current(PhoneFlow::SignIn).is_none());
        assert!(v.current(PhoneFlow::SignUp).is_some());
    }
}
