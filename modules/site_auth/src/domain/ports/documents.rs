use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// One field of a write. `ServerTimestamp` is resolved by the store at commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    Value(Value),
    ServerTimestamp,
}

impl FieldWrite {
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }
}

pub type DocumentWrite = BTreeMap<String, FieldWrite>;

/// Handle for an attached real-time listener. Consuming `self` releases it,
/// so a handle can be released at most once.
pub trait Subscription: Send {
    fn unsubscribe(self: Box<Self>);
}

/// Receives real-time snapshots of a single document.
pub trait DocumentListener: Send + Sync {
    /// `None` means the document does not exist.
    fn on_snapshot(&self, snapshot: Option<&Document>);

    fn on_error(&self, error: &anyhow::Error);
}

/// Reasons the store may refuse to enable its offline cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Another tab already owns the cache.
    #[error("persistence failed: multiple tabs open")]
    FailedPrecondition,

    #[error("persistence not available")]
    Unimplemented,

    #[error("persistence error: {0}")]
    Other(String),
}

/// Capability interface of the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;

    /// Write a document. With `merge` the fields are merged into an existing
    /// document, otherwise the document is replaced.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: DocumentWrite,
        merge: bool,
    ) -> anyhow::Result<()>;

    /// Update fields of an existing document. Fails if it does not exist.
    async fn update(&self, collection: &str, id: &str, partial: DocumentWrite)
        -> anyhow::Result<()>;

    /// Add a document under a store-generated id and return that id.
    async fn add(&self, collection: &str, data: DocumentWrite) -> anyhow::Result<String>;

    /// Attach a real-time listener. The current snapshot is delivered as soon
    /// as the listener is attached.
    fn subscribe(
        &self,
        collection: &str,
        id: &str,
        listener: Arc<dyn DocumentListener>,
    ) -> anyhow::Result<Box<dyn Subscription>>;

    async fn enable_persistence(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
