use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::model::{NewContact, NewProfile, UserProfile};
use crate::domain::ports::Subscription;

/// Receives real-time updates of one user profile.
pub trait ProfileListener: Send + Sync {
    /// `None` while the profile has not been provisioned.
    fn on_profile(&self, profile: Option<UserProfile>);

    fn on_error(&self, error: &anyhow::Error);
}

/// Port for the domain layer: profile persistence the flows need.
#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    async fn find(&self, uid: &str) -> anyhow::Result<Option<UserProfile>>;

    /// Write a new profile with server-assigned `createdAt`/`updatedAt`.
    /// With `merge`, fields already stored but absent from `profile` survive.
    async fn create(&self, uid: &str, profile: NewProfile, merge: bool) -> anyhow::Result<()>;

    /// Bump `updatedAt` on an existing profile.
    async fn touch(&self, uid: &str) -> anyhow::Result<()>;

    fn watch(
        &self,
        uid: &str,
        listener: Arc<dyn ProfileListener>,
    ) -> anyhow::Result<Box<dyn Subscription>>;
}

#[async_trait]
pub trait ContactsRepository: Send + Sync {
    /// Store a submission and return its document id.
    async fn add(&self, contact: NewContact) -> anyhow::Result<String>;
}
