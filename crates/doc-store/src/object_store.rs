//! Document store backed by any `object_store` backend (memory, local
//! filesystem, S3, HTTP).
//!
//! Each document is one JSON object at `{prefix}/{database}/{collection}/{id}.json`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{path::Path, ObjectStore};
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

use crate::document::{Document, DocumentId, Filter, Namespace, ID_FIELD};
use crate::error::{StoreError, StoreResult};
use crate::store::{DocumentStore, StoreConnector};

const DOCUMENT_EXTENSION: &str = "json";

/// Document store writing JSON objects through an [`ObjectStore`].
pub struct ObjectDocumentStore {
    store: Arc<dyn ObjectStore>,
    prefix: Path,
}

impl ObjectDocumentStore {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: Path) -> Self {
        Self { store, prefix }
    }

    /// Open a store from a URL such as `memory:///`, `file:///tmp/docs` or
    /// `s3://bucket/prefix`.
    pub fn from_url(address: &str) -> StoreResult<Self> {
        let url = Url::parse(address)
            .map_err(|e| StoreError::invalid_address(address, e.to_string()))?;
        let (store, prefix) = object_store::parse_url(&url)
            .map_err(|e| StoreError::invalid_address(address, e.to_string()))?;
        Ok(Self::new(Arc::from(store), prefix))
    }

    fn collection_path(&self, namespace: &Namespace) -> Path {
        self.prefix
            .child(namespace.database())
            .child(namespace.collection())
    }

    fn document_path(&self, namespace: &Namespace, id: &DocumentId) -> Path {
        self.collection_path(namespace)
            .child(format!("{}.{}", id, DOCUMENT_EXTENSION))
    }

    async fn read_document(&self, location: &Path) -> StoreResult<Option<Document>> {
        let result = match self.store.get(location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => {
                return Err(StoreError::backend(format!(
                    "Failed to read {}: {}",
                    location, e
                )))
            }
        };
        let bytes = result
            .bytes()
            .await
            .map_err(|e| StoreError::backend(format!("Failed to read bytes: {}", e)))?;
        debug!(size = bytes.len(), "Read document");
        let document = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::invalid_document(format!("{}: {}", location, e)))?;
        Ok(Some(document))
    }
}

#[async_trait]
impl DocumentStore for ObjectDocumentStore {
    #[instrument(skip(self, document), fields(namespace = %namespace))]
    async fn put(&self, namespace: &Namespace, mut document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::of(&document).unwrap_or_else(DocumentId::generate);
        document.insert(ID_FIELD.to_string(), id.to_string().into());

        let location = self.document_path(namespace, &id);
        let data = Bytes::from(serde_json::to_vec(&document)?);
        debug!(size = data.len(), path = %location, "Writing document");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| StoreError::backend(format!("Failed to write {}: {}", location, e)))?;

        Ok(id)
    }

    #[instrument(skip(self), fields(namespace = %namespace, id = %id))]
    async fn get_by_id(
        &self,
        namespace: &Namespace,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>> {
        self.read_document(&self.document_path(namespace, id)).await
    }

    #[instrument(skip(self, filter), fields(namespace = %namespace))]
    async fn query(&self, namespace: &Namespace, filter: &Filter) -> StoreResult<Vec<Document>> {
        let prefix = self.collection_path(namespace);
        let mut metas = Vec::new();
        let mut stream = self.store.list(Some(&prefix));
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| StoreError::backend(format!("List failed: {}", e)))?
        {
            if meta.location.extension() == Some(DOCUMENT_EXTENSION) {
                metas.push(meta);
            }
        }
        // Object listings carry no insertion order; modification time is the
        // closest stand-in, with the path as tiebreak.
        metas.sort_by(|a, b| {
            a.last_modified
                .cmp(&b.last_modified)
                .then_with(|| a.location.cmp(&b.location))
        });

        let mut documents = Vec::new();
        for meta in metas {
            if let Some(doc) = self.read_document(&meta.location).await? {
                if filter.matches(&doc) {
                    documents.push(doc);
                }
            }
        }
        debug!(count = documents.len(), "Query complete");
        Ok(documents)
    }
}

/// Connector that opens an [`ObjectDocumentStore`] for each address URL.
#[derive(Debug, Clone, Default)]
pub struct ObjectStoreConnector;

#[async_trait]
impl StoreConnector for ObjectStoreConnector {
    async fn connect(&self, address: &str) -> StoreResult<Arc<dyn DocumentStore>> {
        Ok(Arc::new(ObjectDocumentStore::from_url(address)?))
    }
}
