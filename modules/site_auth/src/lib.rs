//! # Site auth
//!
//! Client-side auth layer of the DYNAMIC.ORG site: session sync, credential
//! flows, the contact form and modal/nav state, written against capability
//! traits for the hosted identity provider and document store.
//!
//! ```rust,ignore
//! let auth = SiteAuth::new(config, identity, store, presenter);
//! auth.start().await?;
//! auth.forms().submit_login(&fields).await;
//! ```

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};
pub use contract::{SiteAuthApi, SiteAuthError};

pub mod config;
pub use config::SiteAuthConfig;

mod module;
pub use module::SiteAuth;

pub mod api;
pub use api::forms::{ids, FieldValues, SiteForms};

pub mod infra;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
