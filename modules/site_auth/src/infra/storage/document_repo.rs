//! Repository implementations over the hosted document store.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::warn;

use crate::contract::model::{NewContact, NewProfile, UserProfile};
use crate::domain::ports::{Document, DocumentListener, DocumentStore, Subscription};
use crate::domain::repo::{ContactsRepository, ProfileListener, ProfilesRepository};
use crate::infra::storage::mapper;

/// Profiles live in one collection, one document per identity uid.
pub struct DocumentProfilesRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl DocumentProfilesRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl ProfilesRepository for DocumentProfilesRepository {
    async fn find(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        let doc = self
            .store
            .get(&self.collection, uid)
            .await
            .context("find profile failed")?;
        doc.as_ref().map(mapper::document_to_profile).transpose()
    }

    async fn create(&self, uid: &str, profile: NewProfile, merge: bool) -> anyhow::Result<()> {
        self.store
            .set(
                &self.collection,
                uid,
                mapper::new_profile_to_write(profile),
                merge,
            )
            .await
            .context("create profile failed")
    }

    async fn touch(&self, uid: &str) -> anyhow::Result<()> {
        self.store
            .update(&self.collection, uid, mapper::touch_write())
            .await
            .context("touch profile failed")
    }

    fn watch(
        &self,
        uid: &str,
        listener: Arc<dyn ProfileListener>,
    ) -> anyhow::Result<Box<dyn Subscription>> {
        self.store
            .subscribe(&self.collection, uid, Arc::new(ProfileSnapshots(listener)))
            .context("watch profile failed")
    }
}

/// Decodes raw snapshots before handing them to a profile listener.
struct ProfileSnapshots(Arc<dyn ProfileListener>);

impl DocumentListener for ProfileSnapshots {
    fn on_snapshot(&self, snapshot: Option<&Document>) {
        match snapshot.map(mapper::document_to_profile).transpose() {
            Ok(profile) => self.0.on_profile(profile),
            Err(e) => {
                // Rendered like a missing profile.
                warn!(error = %e, "undecodable profile snapshot");
                self.0.on_profile(None);
            }
        }
    }

    fn on_error(&self, error: &anyhow::Error) {
        self.0.on_error(error);
    }
}

pub struct DocumentContactsRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl DocumentContactsRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl ContactsRepository for DocumentContactsRepository {
    async fn add(&self, contact: NewContact) -> anyhow::Result<String> {
        self.store
            .add(&self.collection, mapper::new_contact_to_write(contact))
            .await
            .context("add contact submission failed")
    }
}
