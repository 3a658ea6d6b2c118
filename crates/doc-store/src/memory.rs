//! In-process document store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Document, DocumentId, Filter, Namespace, ID_FIELD};
use crate::error::StoreResult;
use crate::store::DocumentStore;

#[derive(Default)]
struct Collection {
    order: Vec<DocumentId>,
    docs: HashMap<DocumentId, Document>,
}

/// Document store held entirely in memory.
///
/// Query results come back in insertion order; replacing a document keeps
/// its original position.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Namespace, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held in a namespace.
    pub async fn len(&self, namespace: &Namespace) -> usize {
        self.collections
            .read()
            .await
            .get(namespace)
            .map(|c| c.order.len())
            .unwrap_or(0)
    }

    pub async fn is_empty(&self, namespace: &Namespace) -> bool {
        self.len(namespace).await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, namespace: &Namespace, mut document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::of(&document).unwrap_or_else(DocumentId::generate);
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().await;
        let collection = collections.entry(namespace.clone()).or_default();
        if collection.docs.insert(id.clone(), document).is_none() {
            collection.order.push(id.clone());
        }
        debug!(namespace = %namespace, id = %id, "Stored document");
        Ok(id)
    }

    async fn get_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(namespace)
            .and_then(|c| c.docs.get(id).cloned()))
    }

    async fn query(&self, namespace: &Namespace, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(namespace) else {
            return Ok(Vec::new());
        };
        Ok(collection
            .order
            .iter()
            .filter_map(|id| collection.docs.get(id))
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }
}
