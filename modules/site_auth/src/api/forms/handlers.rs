//! Page event handlers. Every flow ends here: errors of any kind become one
//! blocking alert and the triggering control is re-enabled. Local validation
//! runs before the control is disabled; a disabled control ignores submits.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::api::forms::dto::{self, FieldValues};
use crate::contract::model::{EmailSignIn, EmailSignUp, NewContact, PhoneFlow, SocialProvider};
use crate::domain::error::DomainError;
use crate::domain::messages;
use crate::domain::ports::{Presenter, UiUpdate};
use crate::domain::service::Service;
use crate::domain::validation;
use crate::domain::ui::{AuthTab, Form, Modal, SiteUi, SubmitControl};

pub struct SiteForms {
    service: Arc<Service>,
    ui: Arc<SiteUi>,
    presenter: Arc<dyn Presenter>,
    login_submit: SubmitControl,
    signup_submit: SubmitControl,
    contact_submit: SubmitControl,
}

impl SiteForms {
    pub fn new(service: Arc<Service>, ui: Arc<SiteUi>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            login_submit: SubmitControl::new(Form::Login, "Login", presenter.clone()),
            signup_submit: SubmitControl::new(Form::Signup, "Create Account", presenter.clone()),
            contact_submit: SubmitControl::new(Form::Contact, "Send Message", presenter.clone()),
            service,
            ui,
            presenter,
        }
    }

    pub fn ui(&self) -> &SiteUi {
        &self.ui
    }

    // --- navigation & modals ---

    pub fn open_modal(&self, modal: Modal) {
        self.ui.close_nav();
        self.ui.open(modal);
    }

    pub fn close_modal(&self, modal: Modal) {
        self.ui.close(modal);
    }

    pub async fn switch_modal(&self, from: Modal, to: Modal) {
        self.ui.switch(from, to).await;
    }

    /// Click on an auth tab carrying `data-tab`.
    pub fn select_tab(&self, data_tab: &str) {
        match AuthTab::from_data_tab(data_tab) {
            Some(tab) => self.ui.select_tab(tab),
            None => debug!(data_tab, "ignoring unknown auth tab"),
        }
    }

    pub fn toggle_nav(&self) {
        self.ui.toggle_nav();
    }

    pub fn nav_link_clicked(&self) {
        self.ui.close_nav();
    }

    // --- credential flows ---

    #[instrument(name = "site_auth.forms.submit_login", skip_all)]
    pub async fn submit_login(&self, fields: &FieldValues) {
        let form = EmailSignIn::from(fields);
        if let Err(e) = validation::validate_sign_in(&form) {
            return self.fail(e.into());
        }
        let Some(_busy) = self.login_submit.busy("Logging in...") else {
            return;
        };
        match self.service.sign_in_with_email(form).await {
            Ok(signed_in) => {
                self.alert(messages::welcome_back(&signed_in.display_name));
                self.ui.close(Modal::Login);
                self.reset(Form::Login);
            }
            Err(e) => self.fail(e),
        }
    }

    #[instrument(name = "site_auth.forms.submit_signup", skip_all)]
    pub async fn submit_signup(&self, fields: &FieldValues) {
        let form = EmailSignUp::from(fields);
        let min_len = self.service.config().min_password_length;
        if let Err(e) = validation::validate_sign_up(&form, min_len) {
            return self.fail(e.into());
        }
        let Some(_busy) = self.signup_submit.busy("Creating account...") else {
            return;
        };
        match self.service.sign_up_with_email(form).await {
            Ok(signed_in) => {
                self.alert(messages::account_created(&signed_in.display_name));
                self.ui.close(Modal::Signup);
                self.reset(Form::Signup);
            }
            Err(e) => self.fail(e),
        }
    }

    /// Google/Apple buttons in either modal.
    #[instrument(name = "site_auth.forms.social", skip(self))]
    pub async fn social(&self, provider: SocialProvider) {
        self.ui.close_nav();
        match self.service.sign_in_with_social(provider).await {
            Ok(signed_in) => {
                let text = if signed_in.profile_created {
                    messages::social_account_created(&signed_in.display_name)
                } else {
                    messages::welcome_back(&signed_in.display_name)
                };
                self.alert(text);
                self.ui.close(Modal::Login);
                self.ui.close(Modal::Signup);
            }
            Err(e) => self.fail(e),
        }
    }

    #[instrument(name = "site_auth.forms.request_phone_code", skip(self, fields))]
    pub async fn request_phone_code(&self, flow: PhoneFlow, fields: &FieldValues) {
        let number = dto::phone_number(flow, fields);
        match self.service.request_phone_code(flow, &number).await {
            Ok(()) => {
                self.presenter
                    .present(&UiUpdate::CodeEntry { flow, visible: true });
                self.alert(messages::CODE_SENT.to_string());
            }
            Err(e) => self.fail(e),
        }
    }

    #[instrument(name = "site_auth.forms.verify_phone_code", skip(self, fields))]
    pub async fn verify_phone_code(&self, flow: PhoneFlow, fields: &FieldValues) {
        let verification = dto::phone_verification(flow, fields);
        match self.service.verify_phone_code(flow, verification).await {
            Ok(signed_in) => {
                self.alert(messages::phone_verified(flow, &signed_in.display_name));
                match flow {
                    PhoneFlow::SignIn => {
                        self.ui.close(Modal::Login);
                        self.reset(Form::Login);
                    }
                    PhoneFlow::SignUp => {
                        self.ui.close(Modal::Signup);
                        self.reset(Form::Signup);
                        self.reset(Form::PhoneSignup);
                    }
                }
                self.presenter
                    .present(&UiUpdate::CodeEntry { flow, visible: false });
            }
            Err(e) => self.fail(e),
        }
    }

    #[instrument(name = "site_auth.forms.logout", skip_all)]
    pub async fn logout(&self) {
        match self.service.sign_out().await {
            Ok(()) => self.alert(messages::SIGNED_OUT.to_string()),
            Err(e) => self.fail(e),
        }
    }

    #[instrument(name = "site_auth.forms.submit_contact", skip_all)]
    pub async fn submit_contact(&self, fields: &FieldValues) {
        let form = NewContact::from(fields);
        if let Err(e) = validation::validate_contact(&form) {
            return self.fail(e.into());
        }
        let (name, email) = (form.name.clone(), form.email.clone());

        let Some(_busy) = self.contact_submit.busy("Sending...") else {
            return;
        };
        match self.service.submit_contact(form).await {
            Ok(_) => {
                self.alert(messages::contact_received(&name, &email));
                self.reset(Form::Contact);
            }
            Err(e) => self.fail(e),
        }
    }

    // --- helpers ---

    fn alert(&self, text: String) {
        self.presenter.present(&UiUpdate::Alert(text));
    }

    fn reset(&self, form: Form) {
        self.presenter.present(&UiUpdate::FormReset(form));
    }

    fn fail(&self, e: DomainError) {
        match &e {
            DomainError::Validation(_) | DomainError::NoPendingVerification { .. } => {
                debug!(error = %e, "rejected locally");
            }
            DomainError::Rejected { .. } => warn!(error = %e, "rejected by provider"),
            DomainError::Unavailable { .. } => error!(error = %e, "backend call failed"),
        }
        self.alert(e.user_message());
    }
}
