//! Keeps the header's session view in step with the identity provider.
//!
//! Every identity change releases the profile listener attached for the
//! previous identity before anything else happens, so at most one listener
//! is alive at a time. Listeners are tagged with a generation; snapshots
//! delivered for an older generation are dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::contract::model::{Identity, SessionView, UserProfile};
use crate::domain::ports::{Presenter, Subscription, UiUpdate};
use crate::domain::repo::{ProfileListener, ProfilesRepository};

#[derive(Default)]
struct ListenerSlot {
    generation: u64,
    active: Option<Box<dyn Subscription>>,
}

pub struct SessionSync {
    profiles: Arc<dyn ProfilesRepository>,
    presenter: Arc<dyn Presenter>,
    slot: Arc<Mutex<ListenerSlot>>,
}

impl SessionSync {
    pub fn new(profiles: Arc<dyn ProfilesRepository>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            profiles,
            presenter,
            slot: Arc::new(Mutex::new(ListenerSlot::default())),
        }
    }

    /// Whether a profile listener is currently attached.
    pub fn has_listener(&self) -> bool {
        self.slot.lock().active.is_some()
    }

    /// Follow `changes` until the provider drops its sender, then release
    /// the remaining listener.
    pub async fn run(&self, mut changes: watch::Receiver<Option<Identity>>) {
        let initial = changes.borrow_and_update().clone();
        self.on_identity_changed(initial);

        while changes.changed().await.is_ok() {
            let identity = changes.borrow_and_update().clone();
            self.on_identity_changed(identity);
        }

        debug!("identity stream closed");
        self.release();
    }

    #[instrument(
        name = "site_auth.session.on_identity_changed",
        skip(self, identity),
        fields(uid = identity.as_ref().map(|i| i.uid.as_str()).unwrap_or("-"))
    )]
    pub fn on_identity_changed(&self, identity: Option<Identity>) {
        let generation = self.release();

        let Some(identity) = identity else {
            info!("signed out");
            self.presenter
                .present(&UiUpdate::Session(SessionView::SignedOut));
            return;
        };

        let listener = Arc::new(ProfileView {
            generation,
            identity: identity.clone(),
            slot: self.slot.clone(),
            presenter: self.presenter.clone(),
        });

        // The store may deliver the first snapshot from inside `watch`, so the
        // slot lock must not be held here.
        match self.profiles.watch(&identity.uid, listener) {
            Ok(subscription) => {
                let mut slot = self.slot.lock();
                if slot.generation == generation {
                    slot.active = Some(subscription);
                    return;
                }
                drop(slot);
                debug!("identity changed while attaching; dropping listener");
                subscription.unsubscribe();
            }
            Err(e) => {
                warn!(error = %e, "failed to attach profile listener");
                self.presenter.present(&UiUpdate::Session(SessionView::SignedIn {
                    display_name: identity.fallback_label(),
                }));
            }
        }
    }

    /// Release the active listener (if any) and start a new generation.
    /// Returns the new generation.
    pub fn release(&self) -> u64 {
        let (generation, previous) = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            (slot.generation, slot.active.take())
        };
        if let Some(subscription) = previous {
            debug!("releasing profile listener");
            subscription.unsubscribe();
        }
        generation
    }
}

impl Drop for SessionSync {
    fn drop(&mut self) {
        if let Some(subscription) = self.slot.lock().active.take() {
            subscription.unsubscribe();
        }
    }
}

/// Text shown in the header for an identity and its (possibly missing) profile.
pub fn display_name_for(identity: &Identity, profile: Option<&UserProfile>) -> String {
    profile
        .and_then(UserProfile::display_label)
        .map(str::to_string)
        .unwrap_or_else(|| identity.fallback_label())
}

struct ProfileView {
    generation: u64,
    identity: Identity,
    slot: Arc<Mutex<ListenerSlot>>,
    presenter: Arc<dyn Presenter>,
}

impl ProfileListener for ProfileView {
    fn on_profile(&self, profile: Option<UserProfile>) {
        let current = self.slot.lock().generation;
        if current != self.generation {
            debug!(
                stale = self.generation,
                current, "dropping snapshot from superseded listener"
            );
            return;
        }
        let display_name = display_name_for(&self.identity, profile.as_ref());
        self.presenter
            .present(&UiUpdate::Session(SessionView::SignedIn { display_name }));
    }

    fn on_error(&self, error: &anyhow::Error) {
        error!(uid = %self.identity.uid, error = %error, "Error getting user data");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(email: Option<&str>, phone: Option<&str>) -> Identity {
        Identity {
            uid: "u1".into(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            display_name: None,
        }
    }

    fn profile(name: &str, email: &str) -> UserProfile {
        UserProfile {
            name: name.into(),
            email: email.into(),
            phone: None,
            provider: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn name_wins_over_email() {
        let id = identity(Some("id@b.com"), None);
        assert_eq!(
            display_name_for(&id, Some(&profile("Ada", "p@b.com"))),
            "Ada"
        );
        assert_eq!(display_name_for(&id, Some(&profile("", "p@b.com"))), "p@b.com");
    }

    #[test]
    fn missing_profile_falls_back_to_identity() {
        assert_eq!(
            display_name_for(&identity(Some("id@b.com"), None), None),
            "id@b.com"
        );
        assert_eq!(
            display_name_for(&identity(None, Some("+15550001")), None),
            "+15550001"
        );
        assert_eq!(display_name_for(&identity(None, None), None), "User");
    }
}
