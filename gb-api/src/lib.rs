//! Gatrabali API - HTTP clients for the managed services the handlers use.
//!
//! This crate provides a shared HTTP client with bearer authentication and
//! error classification, an access-token source for Google APIs, a Firestore
//! REST client implementing `DocumentStore`, and an FCM HTTP v1 client
//! implementing `PushMessenger`.

pub mod client;
pub mod response;
pub mod auth;
pub mod firestore;
pub mod fcm;

// Re-export key types
pub use client::HttpClient;
pub use response::ApiError;
pub use auth::{AccessToken, AccessTokenSource};
pub use firestore::FirestoreClient;
pub use fcm::{DryRunMessenger, FcmClient};
