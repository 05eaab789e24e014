//! Scripted walk through the site flows against the in-memory backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use site_auth::contract::model::{Identity, PhoneFlow, SocialProvider};
use site_auth::domain::ui::Modal;
use site_auth::infra::memory::{InMemoryDocumentStore, InMemoryIdentityProvider};
use site_auth::{ids, FieldValues, SiteAuth, SiteAuthConfig};
use tracing::info;

use crate::presenter::ConsolePresenter;

const DEMO_PHONE: &str = "+15550100200";

pub async fn run(config: SiteAuthConfig) -> Result<()> {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let store = InMemoryDocumentStore::new();
    let site = SiteAuth::new(
        config,
        identity.clone(),
        Arc::new(store.clone()),
        Arc::new(ConsolePresenter),
    );
    site.start().await?;
    let forms = site.forms();

    info!("email sign-up");
    forms.open_modal(Modal::Signup);
    forms
        .submit_signup(
            &FieldValues::new()
                .with(ids::SIGNUP_NAME, "Ada Lovelace")
                .with(ids::SIGNUP_EMAIL, "ada@dynamic.org")
                .with(ids::SIGNUP_PASSWORD, "engine1")
                .with(ids::CONFIRM_PASSWORD, "engine1")
                .with(ids::AGREE_TERMS, "on"),
        )
        .await;
    forms.logout().await;

    info!("email sign-in");
    forms.open_modal(Modal::Login);
    forms
        .submit_login(
            &FieldValues::new()
                .with(ids::LOGIN_EMAIL, "ada@dynamic.org")
                .with(ids::LOGIN_PASSWORD, "wrong"),
        )
        .await;
    forms
        .submit_login(
            &FieldValues::new()
                .with(ids::LOGIN_EMAIL, "ada@dynamic.org")
                .with(ids::LOGIN_PASSWORD, "engine1"),
        )
        .await;
    forms.logout().await;

    info!("social sign-in");
    identity.script_popup(
        SocialProvider::Google,
        Ok(Identity {
            uid: "google-grace".into(),
            email: Some("grace@dynamic.org".into()),
            phone: None,
            display_name: Some("Grace Hopper".into()),
        }),
    );
    forms.open_modal(Modal::Login);
    forms.social(SocialProvider::Google).await;
    forms.logout().await;

    info!("phone sign-up");
    forms.open_modal(Modal::Signup);
    forms.select_tab("phone-signup");
    forms
        .request_phone_code(
            PhoneFlow::SignUp,
            &FieldValues::new().with(ids::SIGNUP_PHONE, DEMO_PHONE),
        )
        .await;
    let sent = identity
        .last_code(DEMO_PHONE)
        .context("no verification code was sent")?;
    forms
        .verify_phone_code(
            PhoneFlow::SignUp,
            &FieldValues::new()
                .with(ids::PHONE_SIGNUP_CODE, sent)
                .with(ids::SIGNUP_PHONE_NAME, "Katherine"),
        )
        .await;

    info!("contact form");
    forms
        .submit_contact(
            &FieldValues::new()
                .with(ids::CONTACT_NAME, "Katherine")
                .with(ids::CONTACT_EMAIL, "katherine@dynamic.org")
                .with(ids::CONTACT_SUBJECT, "Hello")
                .with(ids::CONTACT_MESSAGE, "Counting on you."),
        )
        .await;
    forms.logout().await;

    let users = store.documents(&site.config().users_collection).len();
    let contacts = store.documents(&site.config().contacts_collection).len();
    site.stop().await;

    println!("demo finished: {users} profiles, {contacts} contact submissions");
    Ok(())
}
