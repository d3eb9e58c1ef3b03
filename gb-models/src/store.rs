//! Document store seam used by the handlers.

use async_trait::async_trait;

use gb_core::error::GbResult;

use crate::document::Document;
use crate::value::FieldValue;

/// Minimal document store interface the handlers depend on.
///
/// Implemented by the Firestore REST client and by the local SQLite store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document; a missing document is `GbError::DocumentNotFound`.
    async fn get_document(&self, collection: &str, id: &str) -> GbResult<Document>;

    /// Replace one field of an existing document.
    ///
    /// Fails with `GbError::DocumentNotFound` if the document does not exist.
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: FieldValue,
    ) -> GbResult<()>;
}
