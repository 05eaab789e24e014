#![allow(dead_code)]
use std::sync::Arc;

use site_auth::contract::model::{PhoneFlow, PhoneVerification, UserProfile};
use site_auth::domain::ports::Document;
use site_auth::infra::memory::{InMemoryDocumentStore, InMemoryIdentityProvider, RecordingPresenter};
use site_auth::infra::storage::mapper;
use site_auth::{SiteAuth, SiteAuthConfig};

pub const PHONE: &str = "+15551234567";

/// A site wired against the in-memory backend.
pub struct Site {
    pub identity: Arc<InMemoryIdentityProvider>,
    pub store: InMemoryDocumentStore,
    pub presenter: Arc<RecordingPresenter>,
    pub auth: SiteAuth,
}

impl Site {
    pub fn new() -> Self {
        Self::with_config(SiteAuthConfig::default())
    }

    pub fn with_config(config: SiteAuthConfig) -> Self {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let store = InMemoryDocumentStore::new();
        let presenter = Arc::new(RecordingPresenter::new());
        let auth = SiteAuth::new(
            config,
            identity.clone(),
            Arc::new(store.clone()),
            presenter.clone(),
        );
        Self {
            identity,
            store,
            presenter,
            auth,
        }
    }

    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.profile_doc(uid)
            .map(|doc| mapper::document_to_profile(&doc).expect("profile decodes"))
    }

    pub fn profile_doc(&self, uid: &str) -> Option<Document> {
        self.store
            .document(&self.auth.config().users_collection, uid)
    }

    pub fn profile_count(&self) -> usize {
        self.store
            .documents(&self.auth.config().users_collection)
            .len()
    }

    pub fn contacts(&self) -> Vec<(String, Document)> {
        self.store
            .documents(&self.auth.config().contacts_collection)
    }

    /// Request a code for `flow` and return the code the provider "texted".
    pub async fn request_code(&self, flow: PhoneFlow, number: &str) -> String {
        self.auth
            .service()
            .request_phone_code(flow, number)
            .await
            .expect("code requested");
        self.identity.last_code(number).expect("code sent")
    }
}

pub fn code(code: &str) -> PhoneVerification {
    PhoneVerification {
        code: code.to_string(),
        name: None,
    }
}

/// Let spawned tasks observe pending identity changes.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
