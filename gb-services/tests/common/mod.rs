//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::TempDir;

use gb_core::config::StoreConfig;
use gb_core::error::{GbError, GbResult};
use gb_models::{
    Document, DocumentStore, FieldValue, Fields, LocalStore, Message, PubSubMessage,
    PushMessenger, SendReceipt, SyncPayload,
};
use gb_services::{ClientProvider, SyncRoutines};

/// Wrap a JSON payload the way Pub/Sub delivers it.
pub fn pubsub(payload: &serde_json::Value) -> PubSubMessage {
    let envelope = serde_json::json!({ "data": STANDARD.encode(payload.to_string()) });
    PubSubMessage::from_slice(envelope.to_string().as_bytes()).expect("valid envelope")
}

/// A token map whose values are distinct so round-trips are observable.
pub fn token_map(entries: &[(&str, &str)]) -> FieldValue {
    FieldValue::map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::StringValue(v.to_string())))
            .collect(),
    )
}

/// A user document holding a name and, optionally, a token field.
pub fn user_fields(tokens: Option<FieldValue>) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".into(), FieldValue::StringValue("Made".into()));
    if let Some(tokens) = tokens {
        fields.insert("fcm_tokens".into(), tokens);
    }
    fields
}

/// Create a temporary local store. Hold the TempDir for the test duration.
pub fn create_test_store() -> (LocalStore, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("documents.db");
    let store = LocalStore::init(&path, &StoreConfig::default()).expect("failed to init store");
    (store, dir)
}

// ---- Document store ----

#[derive(Default)]
struct FakeStoreState {
    docs: HashMap<(String, String), Fields>,
    gets: usize,
    updates: Vec<(String, String, String, FieldValue)>,
    fail_updates: bool,
}

/// In-memory document store that records its calls.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<FakeStoreState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        let mut state = self.state.lock().unwrap();
        state.docs.insert((collection.into(), id.into()), fields);
    }

    pub fn fields(&self, collection: &str, id: &str) -> Option<Fields> {
        let state = self.state.lock().unwrap();
        state.docs.get(&(collection.into(), id.into())).cloned()
    }

    pub fn fail_updates(&self) {
        self.state.lock().unwrap().fail_updates = true;
    }

    pub fn get_count(&self) -> usize {
        self.state.lock().unwrap().gets
    }

    pub fn update_count(&self) -> usize {
        self.state.lock().unwrap().updates.len()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn get_document(&self, collection: &str, id: &str) -> GbResult<Document> {
        let mut state = self.state.lock().unwrap();
        state.gets += 1;
        match state.docs.get(&(collection.to_string(), id.to_string())) {
            Some(fields) => Ok(Document::new(id, fields.clone())),
            None => Err(GbError::DocumentNotFound {
                collection: collection.into(),
                id: id.into(),
            }),
        }
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: FieldValue,
    ) -> GbResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .updates
            .push((collection.into(), id.into(), field.into(), value.clone()));
        if state.fail_updates {
            return Err(GbError::ServerError {
                status: 503,
                message: "backend unavailable".into(),
            });
        }
        match state.docs.get_mut(&(collection.to_string(), id.to_string())) {
            Some(fields) => {
                fields.insert(field.into(), value);
                Ok(())
            }
            None => Err(GbError::DocumentNotFound {
                collection: collection.into(),
                id: id.into(),
            }),
        }
    }
}

// ---- Push messenger ----

/// Messenger that accepts every token except the configured failures.
#[derive(Clone, Default)]
pub struct FakeMessenger {
    sent: Arc<Mutex<Vec<Message>>>,
    failing: Arc<Mutex<HashMap<String, GbError>>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sends to `token` fail with an unregistered-token rejection.
    pub fn fail_unregistered(&self, token: &str) {
        self.fail_with(
            token,
            GbError::PushRejected {
                status: 404,
                code: Some("UNREGISTERED".into()),
                message: "Requested entity was not found.".into(),
            },
        );
    }

    /// Make sends to `token` fail with a transient error.
    pub fn fail_unavailable(&self, token: &str) {
        self.fail_with(
            token,
            GbError::PushRejected {
                status: 503,
                code: Some("UNAVAILABLE".into()),
                message: "The server is overloaded.".into(),
            },
        );
    }

    fn fail_with(&self, token: &str, err: GbError) {
        self.failing.lock().unwrap().insert(token.into(), err);
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_tokens(&self) -> BTreeSet<String> {
        self.sent().into_iter().map(|m| m.token).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl PushMessenger for FakeMessenger {
    async fn send(&self, message: &Message) -> GbResult<SendReceipt> {
        let n = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(message.clone());
            sent.len()
        };
        match self.failing.lock().unwrap().get(&message.token) {
            Some(GbError::PushRejected { status, code, message }) => Err(GbError::PushRejected {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            }),
            Some(other) => Err(GbError::Http(other.to_string())),
            None => Ok(SendReceipt {
                name: format!("projects/test/messages/{n}"),
            }),
        }
    }
}

// ---- Provider ----

/// Counts acquisitions and drops of the clients it hands out.
#[derive(Clone, Default)]
pub struct Lifecycle {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl Lifecycle {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

struct Tracked<T> {
    inner: T,
    released: Arc<AtomicUsize>,
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for Tracked<Arc<dyn DocumentStore>> {
    async fn get_document(&self, collection: &str, id: &str) -> GbResult<Document> {
        self.inner.get_document(collection, id).await
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: FieldValue,
    ) -> GbResult<()> {
        self.inner.update_field(collection, id, field, value).await
    }
}

#[async_trait]
impl PushMessenger for Tracked<FakeMessenger> {
    async fn send(&self, message: &Message) -> GbResult<SendReceipt> {
        self.inner.send(message).await
    }
}

/// Provider handing out shared fakes, with optional acquisition failures.
#[derive(Clone)]
pub struct FakeProvider {
    pub store: Arc<dyn DocumentStore>,
    pub messenger: FakeMessenger,
    pub stores: Lifecycle,
    pub messengers: Lifecycle,
    pub fail_store: bool,
    pub fail_messenger: bool,
}

impl FakeProvider {
    pub fn new(store: Arc<dyn DocumentStore>, messenger: FakeMessenger) -> Self {
        Self {
            store,
            messenger,
            stores: Lifecycle::default(),
            messengers: Lifecycle::default(),
            fail_store: false,
            fail_messenger: false,
        }
    }
}

#[async_trait]
impl ClientProvider for FakeProvider {
    async fn document_store(&self) -> GbResult<Box<dyn DocumentStore>> {
        if self.fail_store {
            return Err(GbError::AuthFailed("no credentials".into()));
        }
        self.stores.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Tracked {
            inner: Arc::clone(&self.store),
            released: Arc::clone(&self.stores.released),
        }))
    }

    async fn messenger(&self) -> GbResult<Box<dyn PushMessenger>> {
        if self.fail_messenger {
            return Err(GbError::AuthFailed("no credentials".into()));
        }
        self.messengers.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Tracked {
            inner: self.messenger.clone(),
            released: Arc::clone(&self.messengers.released),
        }))
    }
}

// ---- Sync routines ----

/// One recorded routine call.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncCall {
    pub routine: &'static str,
    pub payload: SyncPayload,
    /// Whether the store handed to the routine could read the marker document.
    pub saw_store: bool,
}

/// Sync routines that record every call and return a preset result.
#[derive(Clone, Default)]
pub struct RecordingSync {
    calls: Arc<Mutex<Vec<SyncCall>>>,
    failure: Option<String>,
}

pub const MARKER_COLLECTION: &str = "markers";
pub const MARKER_ID: &str = "sync";

impl RecordingSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<SyncCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(
        &self,
        routine: &'static str,
        store: &dyn DocumentStore,
        payload: &SyncPayload,
    ) -> GbResult<()> {
        let saw_store = store.get_document(MARKER_COLLECTION, MARKER_ID).await.is_ok();
        self.calls.lock().unwrap().push(SyncCall {
            routine,
            payload: payload.clone(),
            saw_store,
        });
        match &self.failure {
            Some(message) => Err(GbError::Sync(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SyncRoutines for RecordingSync {
    async fn start_category_sync(&self, store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()> {
        self.record("category", store, payload).await
    }

    async fn start_feed_sync(&self, store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()> {
        self.record("feed", store, payload).await
    }

    async fn start_entry_sync(&self, store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()> {
        self.record("entry", store, payload).await
    }
}
