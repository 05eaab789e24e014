use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::forms::SiteForms;
use crate::config::SiteAuthConfig;
use crate::contract::client::SiteAuthApi;
use crate::domain::ports::{DocumentStore, IdentityProvider, PersistenceError, Presenter};
use crate::domain::repo::{ContactsRepository, ProfilesRepository};
use crate::domain::service::Service;
use crate::domain::session::SessionSync;
use crate::domain::ui::SiteUi;
use crate::gateways::local::SiteAuthLocalClient;
use crate::infra::storage::{DocumentContactsRepository, DocumentProfilesRepository};

/// The site's auth layer, wired against a backend and a page.
pub struct SiteAuth {
    config: SiteAuthConfig,
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    service: Arc<Service>,
    session: Arc<SessionSync>,
    forms: SiteForms,
    client: Arc<dyn SiteAuthApi>,
    session_task: Mutex<Option<JoinHandle<()>>>,
}

impl SiteAuth {
    pub fn new(
        config: SiteAuthConfig,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let profiles: Arc<dyn ProfilesRepository> = Arc::new(DocumentProfilesRepository::new(
            store.clone(),
            config.users_collection.clone(),
        ));
        let contacts: Arc<dyn ContactsRepository> = Arc::new(DocumentContactsRepository::new(
            store.clone(),
            config.contacts_collection.clone(),
        ));

        let service = Arc::new(Service::new(
            identity.clone(),
            profiles.clone(),
            contacts,
            config.service(),
        ));
        let session = Arc::new(SessionSync::new(profiles, presenter.clone()));
        let ui = Arc::new(SiteUi::new(presenter.clone(), config.modal_transition()));
        let forms = SiteForms::new(service.clone(), ui, presenter);
        let client: Arc<dyn SiteAuthApi> = Arc::new(SiteAuthLocalClient::new(service.clone()));

        Self {
            config,
            identity,
            store,
            service,
            session,
            forms,
            client,
            session_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SiteAuthConfig {
        &self.config
    }

    pub fn forms(&self) -> &SiteForms {
        &self.forms
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn session(&self) -> Arc<SessionSync> {
        self.session.clone()
    }

    /// Typed client for callers that want results instead of alerts.
    pub fn client(&self) -> Arc<dyn SiteAuthApi> {
        self.client.clone()
    }

    /// Enable offline persistence and start following identity changes.
    /// Calling it twice restarts the session task.
    pub async fn start(&self) -> anyhow::Result<()> {
        if self.config.enable_persistence {
            match self.store.enable_persistence().await {
                Ok(()) => debug!("offline persistence enabled"),
                Err(PersistenceError::FailedPrecondition) => {
                    warn!("persistence failed: multiple tabs open");
                }
                Err(PersistenceError::Unimplemented) => {
                    warn!("persistence not available in this environment");
                }
                Err(e) => return Err(anyhow::anyhow!(e).context("enable persistence failed")),
            }
        }

        let session = self.session.clone();
        let changes = self.identity.identity_changes();
        let task = tokio::spawn(async move { session.run(changes).await });

        if let Some(previous) = self.session_task.lock().replace(task) {
            previous.abort();
        }
        info!("site auth started");
        Ok(())
    }

    /// Stop following identity changes and release the profile listener.
    pub async fn stop(&self) {
        let task = self.session_task.lock().take();
        if let Some(task) = task {
            task.abort();
            // A cancelled task reports an error here; nothing to propagate.
            let _ = task.await;
        }
        self.session.release();
        info!("site auth stopped");
    }
}
