//! In-process document store with real-time listeners.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{
    Document, DocumentListener, DocumentStore, DocumentWrite, FieldWrite, PersistenceError,
    Subscription,
};

type Key = (String, String);

#[derive(Default)]
struct State {
    docs: HashMap<Key, Document>,
    listeners: HashMap<Key, Vec<(u64, Arc<dyn DocumentListener>)>>,
    next_listener: u64,
    unavailable: Option<String>,
    persistence: Option<PersistenceError>,
    releases: usize,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
}

#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read and write fail with `message`; `None` heals the store.
    pub fn set_unavailable(&self, message: Option<&str>) {
        self.inner.state.lock().unavailable = message.map(str::to_string);
    }

    /// Outcome reported by the next `enable_persistence` call.
    pub fn set_persistence_error(&self, error: Option<PersistenceError>) {
        self.inner.state.lock().persistence = error;
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.inner
            .state
            .lock()
            .docs
            .get(&key(collection, id))
            .cloned()
    }

    pub fn documents(&self, collection: &str) -> Vec<(String, Document)> {
        self.inner
            .state
            .lock()
            .docs
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect()
    }

    pub fn listener_count(&self, collection: &str, id: &str) -> usize {
        self.inner
            .state
            .lock()
            .listeners
            .get(&key(collection, id))
            .map_or(0, Vec::len)
    }

    /// Total number of listeners released so far.
    pub fn released_listeners(&self) -> usize {
        self.inner.state.lock().releases
    }

    /// Deliver a listener error, as the hosted store does on permission or network failures.
    pub fn fail_listeners(&self, collection: &str, id: &str, error: anyhow::Error) {
        for listener in self.listeners_for(&key(collection, id)) {
            listener.on_error(&error);
        }
    }

    fn check_available(&self) -> anyhow::Result<()> {
        match &self.inner.state.lock().unavailable {
            Some(message) => anyhow::bail!("unavailable: {message}"),
            None => Ok(()),
        }
    }

    fn listeners_for(&self, key: &Key) -> Vec<Arc<dyn DocumentListener>> {
        self.inner
            .state
            .lock()
            .listeners
            .get(key)
            .map(|ls| ls.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    /// Apply a write and notify listeners after the lock is released.
    fn commit(
        &self,
        key: Key,
        data: DocumentWrite,
        apply: impl FnOnce(Option<&mut Document>, Document) -> anyhow::Result<Document>,
    ) -> anyhow::Result<()> {
        let resolved = resolve(data, Utc::now());
        let snapshot = {
            let mut state = self.inner.state.lock();
            let next = apply(state.docs.get_mut(&key), resolved)?;
            state.docs.insert(key.clone(), next.clone());
            next
        };
        for listener in self.listeners_for(&key) {
            listener.on_snapshot(Some(&snapshot));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        self.check_available()?;
        Ok(self.document(collection, id))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: DocumentWrite,
        merge: bool,
    ) -> anyhow::Result<()> {
        self.check_available()?;
        self.commit(key(collection, id), data, |existing, fields| {
            Ok(match existing {
                Some(current) if merge => {
                    let mut merged = current.clone();
                    merged.extend(fields);
                    merged
                }
                _ => fields,
            })
        })
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: DocumentWrite,
    ) -> anyhow::Result<()> {
        self.check_available()?;
        self.commit(key(collection, id), partial, |existing, fields| {
            let Some(current) = existing else {
                anyhow::bail!("not-found: {collection}/{id}");
            };
            let mut updated = current.clone();
            updated.extend(fields);
            Ok(updated)
        })
    }

    async fn add(&self, collection: &str, data: DocumentWrite) -> anyhow::Result<String> {
        self.check_available()?;
        let id = Uuid::new_v4().simple().to_string();
        self.commit(key(collection, &id), data, |_, fields| Ok(fields))?;
        Ok(id)
    }

    fn subscribe(
        &self,
        collection: &str,
        id: &str,
        listener: Arc<dyn DocumentListener>,
    ) -> anyhow::Result<Box<dyn Subscription>> {
        self.check_available()?;
        let key = key(collection, id);
        let (listener_id, snapshot) = {
            let mut state = self.inner.state.lock();
            state.next_listener += 1;
            let listener_id = state.next_listener;
            state
                .listeners
                .entry(key.clone())
                .or_default()
                .push((listener_id, listener.clone()));
            (listener_id, state.docs.get(&key).cloned())
        };

        listener.on_snapshot(snapshot.as_ref());

        Ok(Box::new(MemorySubscription {
            inner: Arc::downgrade(&self.inner),
            key,
            listener_id,
        }))
    }

    async fn enable_persistence(&self) -> Result<(), PersistenceError> {
        match self.inner.state.lock().persistence.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct MemorySubscription {
    inner: Weak<Inner>,
    key: Key,
    listener_id: u64,
}

impl Subscription for MemorySubscription {
    fn unsubscribe(self: Box<Self>) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.state.lock();
        if let Some(listeners) = state.listeners.get_mut(&self.key) {
            listeners.retain(|(id, _)| *id != self.listener_id);
            if listeners.is_empty() {
                state.listeners.remove(&self.key);
            }
        }
        state.releases += 1;
    }
}

fn key(collection: &str, id: &str) -> Key {
    (collection.to_string(), id.to_string())
}

fn resolve(data: DocumentWrite, now: DateTime<Utc>) -> Document {
    data.into_iter()
        .map(|(field, value)| {
            let value = match value {
                FieldWrite::Value(v) => v,
                FieldWrite::ServerTimestamp => Value::String(now.to_rfc3339()),
            };
            (field, value)
        })
        .collect()
}
