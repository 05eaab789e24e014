//! In-process adapters for the hosted backend and the page.

pub mod documents;
pub mod identity;
pub mod presenter;

pub use documents::InMemoryDocumentStore;
pub use identity::{IdentityCall, InMemoryIdentityProvider};
pub use presenter::RecordingPresenter;
