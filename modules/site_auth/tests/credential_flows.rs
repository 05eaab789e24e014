mod common;

use common::{code, Site, PHONE};
use site_auth::contract::model::{
    EmailSignIn, EmailSignUp, Identity, PhoneFlow, PhoneVerification, ProviderTag, SocialProvider,
};
use site_auth::domain::error::DomainError;
use site_auth::domain::ports::ProviderErrorCode;
use site_auth::domain::validation::ValidationError;
use site_auth::infra::memory::IdentityCall;

fn sign_up(password: &str, confirm: &str) -> EmailSignUp {
    EmailSignUp {
        name: "Ada Lovelace".into(),
        email: "a@b.com".into(),
        password: password.into(),
        confirm_password: confirm.into(),
        accepted_terms: true,
    }
}

#[tokio::test]
async fn short_password_is_rejected_before_the_provider() {
    let site = Site::new();
    let err = site
        .auth
        .service()
        .sign_up_with_email(sign_up("abc", "abc"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::Validation(ValidationError::PasswordTooShort { min: 6 })
    );
    assert_eq!(
        err.user_message(),
        "Password must be at least 6 characters long"
    );
    assert_eq!(site.identity.call_count(IdentityCall::CreateAccount), 0);
    assert_eq!(site.profile_count(), 0);
}

#[tokio::test]
async fn mismatched_confirmation_is_rejected() {
    let site = Site::new();
    let err = site
        .auth
        .service()
        .sign_up_with_email(sign_up("secret1", "secret2"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Passwords do not match");
    assert_eq!(site.identity.call_count(IdentityCall::CreateAccount), 0);
}

#[tokio::test]
async fn sign_up_creates_profile_that_reads_back() {
    let site = Site::new();
    let signed_in = site
        .auth
        .service()
        .sign_up_with_email(sign_up("secret1", "secret1"))
        .await
        .unwrap();

    assert_eq!(site.identity.call_count(IdentityCall::CreateAccount), 1);
    assert!(signed_in.profile_created);
    assert_eq!(signed_in.display_name, "Ada Lovelace");

    let profile = site.profile(&signed_in.uid).expect("profile stored");
    assert_eq!(profile.name, "Ada Lovelace");
    assert_eq!(profile.email, "a@b.com");
    assert_eq!(profile.provider, Some(ProviderTag::Password));
    assert!(profile.created_at.is_some());
    assert_eq!(profile.created_at, profile.updated_at);
}

#[tokio::test]
async fn duplicate_sign_up_maps_provider_code() {
    let site = Site::new();
    site.identity.add_account("a@b.com", "secret1", None);

    let err = site
        .auth
        .service()
        .sign_up_with_email(sign_up("secret1", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "An account with this email already exists. Please log in instead."
    );
    assert_eq!(site.profile_count(), 0);
}

#[tokio::test]
async fn email_sign_in_provisions_missing_profile_then_touches_it() {
    let site = Site::new();
    let identity = site.identity.add_account("grace@navy.mil", "secret1", None);
    let service = site.auth.service();
    let form = EmailSignIn {
        email: "grace@navy.mil".into(),
        password: "secret1".into(),
    };

    let first = service.sign_in_with_email(form.clone()).await.unwrap();
    assert!(first.profile_created);
    assert_eq!(first.display_name, "grace@navy.mil");
    let created = site.profile(&identity.uid).unwrap();
    assert_eq!(created.name, "grace");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = service.sign_in_with_email(form).await.unwrap();
    assert!(!second.profile_created);
    assert_eq!(second.display_name, "grace");
    let touched = site.profile(&identity.uid).unwrap();
    assert_eq!(touched.created_at, created.created_at);
    assert!(touched.updated_at > created.updated_at);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_messages() {
    let site = Site::new();
    site.identity.add_account("a@b.com", "secret1", None);
    let service = site.auth.service();

    let err = service
        .sign_in_with_email(EmailSignIn {
            email: "a@b.com".into(),
            password: "nope".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Incorrect password. Please try again.");

    let err = service
        .sign_in_with_email(EmailSignIn {
            email: "who@b.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "No account found with this email. Please sign up."
    );
}

#[tokio::test]
async fn social_sign_in_keeps_existing_profile_metadata() {
    let site = Site::new();
    let identity = Identity {
        uid: "g-1".into(),
        email: Some("ada@gmail.com".into()),
        phone: None,
        display_name: Some("Ada".into()),
    };
    let service = site.auth.service();

    site.identity
        .script_popup(SocialProvider::Google, Ok(identity.clone()));
    let first = service
        .sign_in_with_social(SocialProvider::Google)
        .await
        .unwrap();
    assert!(first.profile_created);
    let created = site.profile("g-1").unwrap();
    assert_eq!(created.provider, Some(ProviderTag::Google));

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    site.identity
        .script_popup(SocialProvider::Apple, Ok(identity));
    let second = service
        .sign_in_with_social(SocialProvider::Apple)
        .await
        .unwrap();
    assert!(!second.profile_created);
    assert_eq!(second.display_name, "Ada");

    let touched = site.profile("g-1").unwrap();
    assert_eq!(touched.provider, Some(ProviderTag::Google));
    assert_eq!(touched.created_at, created.created_at);
    assert!(touched.updated_at > created.updated_at);
}

#[tokio::test]
async fn google_popup_asks_to_select_an_account() {
    let site = Site::new();
    let service = site.auth.service();

    let _ = service.sign_in_with_social(SocialProvider::Google).await;
    let _ = service.sign_in_with_social(SocialProvider::Apple).await;

    let requests = site.identity.popup_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].provider_id, "google.com");
    assert_eq!(
        requests[0].custom_parameters.get("prompt").map(String::as_str),
        Some("select_account")
    );
    assert_eq!(requests[1].provider_id, "apple.com");
    assert!(requests[1].custom_parameters.is_empty());
}

#[tokio::test]
async fn social_failures_use_provider_specific_text() {
    let site = Site::new();
    let service = site.auth.service();

    // Nothing scripted: the popup is closed.
    let err = service
        .sign_in_with_social(SocialProvider::Google)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Sign-in popup was closed. Please try again.");

    site.identity.script_popup(
        SocialProvider::Apple,
        Err(ProviderErrorCode::from_code("auth/internal-error")),
    );
    let err = service
        .sign_in_with_social(SocialProvider::Apple)
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Failed to sign in with Apple. Please try again."
    );
}

#[tokio::test]
async fn stale_code_after_second_request_is_invalid() {
    let site = Site::new();
    let service = site.auth.service();

    let first = site.request_code(PhoneFlow::SignIn, PHONE).await;
    let second = site.request_code(PhoneFlow::SignIn, PHONE).await;
    assert_ne!(first, second);

    let err = service
        .verify_phone_code(PhoneFlow::SignIn, code(&first))
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Invalid verification code. Please try again."
    );

    // The handle survives a failed attempt.
    let ok = service
        .verify_phone_code(PhoneFlow::SignIn, code(&second))
        .await
        .unwrap();
    assert!(ok.profile_created);
    assert_eq!(ok.display_name, "User");
}

#[tokio::test]
async fn second_verify_after_success_has_nothing_pending() {
    let site = Site::new();
    let service = site.auth.service();

    let sent = site.request_code(PhoneFlow::SignIn, PHONE).await;
    service
        .verify_phone_code(PhoneFlow::SignIn, code(&sent))
        .await
        .unwrap();
    assert!(service.pending_verification(PhoneFlow::SignIn).is_none());

    let err = service
        .verify_phone_code(PhoneFlow::SignIn, code(&sent))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::NoPendingVerification {
            flow: PhoneFlow::SignIn
        }
    );
    assert_eq!(site.identity.call_count(IdentityCall::ConfirmPhone), 1);
}

#[tokio::test]
async fn phone_flows_keep_separate_handles() {
    let site = Site::new();
    let service = site.auth.service();

    let sent = site.request_code(PhoneFlow::SignUp, PHONE).await;
    assert!(service.pending_verification(PhoneFlow::SignIn).is_none());

    let err = service
        .verify_phone_code(PhoneFlow::SignIn, code(&sent))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Please request a verification code first.");

    let ok = service
        .verify_phone_code(
            PhoneFlow::SignUp,
            PhoneVerification {
                code: sent,
                name: Some("  Ada  ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(ok.display_name, "Ada");

    let profile = site.profile(&ok.uid).unwrap();
    assert_eq!(profile.phone.as_deref(), Some(PHONE));
    assert_eq!(profile.provider, Some(ProviderTag::Phone));
}

#[tokio::test]
async fn phone_number_gets_prefix_and_bad_numbers_are_mapped() {
    let site = Site::new();
    let service = site.auth.service();

    service
        .request_phone_code(PhoneFlow::SignIn, "15551234567")
        .await
        .unwrap();
    assert!(site.identity.last_code(PHONE).is_some());

    let err = service
        .request_phone_code(PhoneFlow::SignIn, "12")
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Invalid phone number format. Please include country code."
    );

    let err = service
        .request_phone_code(PhoneFlow::SignIn, "   ")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Please enter a phone number");
}

#[tokio::test]
async fn malformed_code_never_reaches_the_provider() {
    let site = Site::new();
    let service = site.auth.service();
    site.request_code(PhoneFlow::SignIn, PHONE).await;

    for bad in ["12345", "12345a", ""] {
        let err = service
            .verify_phone_code(PhoneFlow::SignIn, code(bad))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Please enter a valid 6-digit code");
    }
    assert_eq!(site.identity.call_count(IdentityCall::ConfirmPhone), 0);
}

#[tokio::test]
async fn outages_fall_back_to_flow_messages() {
    let site = Site::new();
    let service = site.auth.service();
    site.identity.set_outage(Some("network down"));

    let err = service.sign_out().await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to log out. Please try again.");

    let err = service
        .request_phone_code(PhoneFlow::SignUp, PHONE)
        .await
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Failed to send verification code. Please try again."
    );
}

#[tokio::test]
async fn store_outage_after_sign_in_reports_flow_failure() {
    let site = Site::new();
    site.identity.add_account("a@b.com", "secret1", None);
    site.store.set_unavailable(Some("offline"));

    let err = site
        .auth
        .service()
        .sign_in_with_email(EmailSignIn {
            email: "a@b.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unavailable { .. }));
    assert_eq!(err.user_message(), "Failed to log in. Please try again.");
}
