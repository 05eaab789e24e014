mod common;

use common::{Site, PHONE};
use site_auth::contract::model::{EmailSignIn, EmailSignUp, PhoneFlow, PhoneVerification};
use site_auth::SiteAuthError;

#[tokio::test]
async fn client_maps_domain_errors() {
    let site = Site::new();
    let client = site.auth.client();

    let err = client
        .sign_up_with_email(EmailSignUp {
            name: "Ada".into(),
            email: "a@b.com".into(),
            password: "abc".into(),
            confirm_password: "abc".into(),
            accepted_terms: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SiteAuthError::Validation { .. }));
    assert_eq!(err.user_message(), "Password must be at least 6 characters long");

    let err = client
        .sign_in_with_email(EmailSignIn {
            email: "a@b.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap_err();
    match err {
        SiteAuthError::Rejected { code, message } => {
            assert_eq!(code, "auth/user-not-found");
            assert_eq!(message, "No account found with this email. Please sign up.");
        }
        other => panic!("Expected Rejected error, got {other:?}"),
    }

    site.identity.set_outage(Some("offline"));
    let err = client.sign_out().await.unwrap_err();
    assert!(matches!(err, SiteAuthError::Unavailable { .. }));
}

#[tokio::test]
async fn client_runs_the_phone_flow() {
    let site = Site::new();
    let client = site.auth.client();

    client
        .request_phone_code(PhoneFlow::SignIn, PHONE)
        .await
        .unwrap();
    let code = site.identity.last_code(PHONE).unwrap();

    let signed_in = client
        .verify_phone_code(PhoneFlow::SignIn, PhoneVerification { code, name: None })
        .await
        .unwrap();
    assert_eq!(site.profile(&signed_in.uid).unwrap().phone.as_deref(), Some(PHONE));
}
