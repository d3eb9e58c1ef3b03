//! Gatrabali Services - The event-triggered handlers and what they depend on.
//!
//! - `provider`: per-invocation acquisition of the document store and push clients
//! - `sync`: routing of sync payloads to the external sync routines
//! - `push`: delivery of one notification to every device of a user
//! - `functions`: the `sync_data` and `send_push_notification` entry points

pub mod provider;
pub mod sync;
pub mod push;
pub mod functions;

pub use provider::{ClientProvider, CloudProvider};
pub use sync::{HttpSyncRoutines, SyncDispatcher, SyncRoutines};
pub use push::{NotificationSender, PushReport};
pub use functions::{send_push_notification, sync_data};
