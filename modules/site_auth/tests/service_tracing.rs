use std::sync::Arc;

use tracing_test::traced_test;

use site_auth::contract::model::{EmailSignIn, NewContact, PhoneFlow};
use site_auth::domain::service::{Service, ServiceConfig};
use site_auth::infra::memory::{InMemoryDocumentStore, InMemoryIdentityProvider};
use site_auth::infra::storage::{DocumentContactsRepository, DocumentProfilesRepository};

fn service(identity: Arc<InMemoryIdentityProvider>) -> Service {
    let store = Arc::new(InMemoryDocumentStore::new());
    Service::new(
        identity,
        Arc::new(DocumentProfilesRepository::new(store.clone(), "users")),
        Arc::new(DocumentContactsRepository::new(store, "contactSubmissions")),
        ServiceConfig::default(),
    )
}

#[traced_test]
#[tokio::test]
async fn sign_in_emits_spans() {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    identity.add_account("ada@b.com", "secret1", None);
    let service = service(identity);

    let result = service
        .sign_in_with_email(EmailSignIn {
            email: "ada@b.com".into(),
            password: "secret1".into(),
        })
        .await;

    assert!(result.is_ok());
    assert!(logs_contain("site_auth.service.sign_in_with_email"));
    assert!(logs_contain("signed in with email"));
}

#[traced_test]
#[tokio::test]
async fn phone_request_does_not_log_the_number() {
    let service = service(Arc::new(InMemoryIdentityProvider::new()));

    let result = service
        .request_phone_code(PhoneFlow::SignIn, "+15551234567")
        .await;

    assert!(result.is_ok());
    assert!(logs_contain("verification code sent"));
    assert!(!logs_contain("5551234567"));
}

#[traced_test]
#[tokio::test]
async fn contact_submission_logs_its_id() {
    let service = service(Arc::new(InMemoryIdentityProvider::new()));

    let id = service
        .submit_contact(NewContact {
            name: "Ada".into(),
            email: "ada@b.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        })
        .await
        .unwrap();

    assert!(logs_contain("site_auth.service.submit_contact"));
    assert!(logs_contain(&id));
}
