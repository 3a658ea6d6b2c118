//! The document-store contract and store connectors.

use async_trait::async_trait;
use std::sync::Arc;

use crate::document::{Document, DocumentId, Filter, Namespace};
use crate::error::StoreResult;

/// A document database addressed by `database.collection` namespaces.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a document and return its identifier.
    ///
    /// A document that already carries an `_id` replaces any stored document
    /// with the same id; otherwise a fresh id is assigned.
    async fn put(&self, namespace: &Namespace, document: Document) -> StoreResult<DocumentId>;

    /// Fetch a single document by id. The returned document includes `_id`.
    async fn get_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>>;

    /// All documents matching a filter, in insertion order.
    async fn query(&self, namespace: &Namespace, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// The first document matching a filter.
    async fn find_first(
        &self,
        namespace: &Namespace,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        Ok(self.query(namespace, filter).await?.into_iter().next())
    }
}

/// Opens a document store from a connection address.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, address: &str) -> StoreResult<Arc<dyn DocumentStore>>;
}

/// Connector that ignores the address and always returns the same store.
///
/// Useful when the store is already open in-process.
#[derive(Clone)]
pub struct FixedConnector {
    store: Arc<dyn DocumentStore>,
}

impl FixedConnector {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StoreConnector for FixedConnector {
    async fn connect(&self, _address: &str) -> StoreResult<Arc<dyn DocumentStore>> {
        Ok(Arc::clone(&self.store))
    }
}
