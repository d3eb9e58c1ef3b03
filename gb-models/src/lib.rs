//! Gatrabali Models - Payloads, document values, store traits, and local storage.
//!
//! This crate owns the data that crosses the handler boundaries:
//! - Trigger envelopes and the sync / push payloads they carry
//! - The typed document value model shared by every store backend
//! - The `DocumentStore` and `PushMessenger` traits the handlers depend on
//! - A SQLite-backed document store for local runs and tests

pub mod value;
pub mod document;
pub mod payload;
pub mod envelope;
pub mod push;
pub mod store;
pub mod schema;
pub mod db;

// Re-export key types
pub use value::{FieldValue, Fields};
pub use document::{Document, FcmTokens, TokenField};
pub use payload::{PushNotificationPayload, SyncPayload, SyncType};
pub use envelope::PubSubMessage;
pub use push::{AndroidConfig, AndroidNotification, Message, Notification, PushMessenger, SendReceipt};
pub use store::DocumentStore;
pub use db::{LocalStore, DbPool};
