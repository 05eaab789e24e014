pub mod documents;
pub mod identity;
pub mod presenter;

pub use documents::{
    Document, DocumentListener, DocumentStore, DocumentWrite, FieldWrite, PersistenceError,
    Subscription,
};
pub use identity::{IdentityProvider, ProviderError, ProviderErrorCode};
pub use presenter::{Presenter, UiUpdate};
