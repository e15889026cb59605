//! # Store
//!
//! In-process [`DocumentStore`](crate::traits::DocumentStore) plus the typed
//! helpers every service uses to move records in and out of JSON documents.

pub mod memory;
pub mod paths;

pub use memory::MemoryDocumentStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::traits::DocumentStore;

/// Read a document and deserialize it.
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &str,
) -> Result<Option<T>> {
    match store.get(path).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// Serialize a record and replace the document.
pub async fn set_typed<T: Serialize + ?Sized>(
    store: &dyn DocumentStore,
    path: &str,
    record: &T,
) -> Result<()> {
    let doc: Value = serde_json::to_value(record)?;
    store.set(path, doc).await
}
