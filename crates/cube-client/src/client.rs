//! Clients that store cubes in a document store and load them back.
//!
//! [`CubeClient`] stores whole cubes (data included) and rebuilds them.
//! [`CatalogClient`] stores metadata-only records and answers queries with
//! the references of the datasets they describe.

use std::sync::Arc;

use cube_codec::{
    catalog_documents, encode_cube, AttributeDecoders, Cube, CubeDecoder, DecodeOptions,
    StoreLocation, DATASET_REF_FIELD,
};
use doc_store::{
    Document, DocumentId, DocumentStore, FixedConnector, Filter, MemoryDocumentStore, Namespace,
    ObjectStoreConnector, StoreConnector,
};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Outcome of a batch insert.
#[derive(Debug, Default)]
pub struct BatchInsertReport {
    /// Ids of the stored documents, in input order.
    pub inserted: Vec<DocumentId>,
    /// Items that could not be stored.
    pub failed: Vec<InsertFailure>,
}

impl BatchInsertReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One item of a batch that could not be stored.
#[derive(Debug)]
pub struct InsertFailure {
    /// Position in the input batch.
    pub index: usize,
    /// Name of the cube.
    pub name: String,
    pub error: ClientError,
}

/// Open the store named by the configuration.
///
/// `memory://` addresses get one shared in-process store, so deferred
/// arrays resolve against the store they were written to.
async fn open_store(config: &ClientConfig) -> Result<(Arc<dyn DocumentStore>, Arc<dyn StoreConnector>)> {
    config.validate().map_err(ClientError::InvalidConfig)?;
    let connector: Arc<dyn StoreConnector> = if config.store_url.starts_with("memory:") {
        Arc::new(FixedConnector::new(Arc::new(MemoryDocumentStore::new())))
    } else {
        Arc::new(ObjectStoreConnector)
    };
    let store = connector.connect(&config.store_url).await?;
    Ok((store, connector))
}

/// Stores cubes as full documents and loads them back.
pub struct CubeClient {
    store: Arc<dyn DocumentStore>,
    connector: Arc<dyn StoreConnector>,
    namespace: Namespace,
    location: StoreLocation,
    decoders: AttributeDecoders,
    config: ClientConfig,
}

impl CubeClient {
    /// Connect using the store address in `config`.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let (store, connector) = open_store(&config).await?;
        Self::new(store, connector, config)
    }

    /// Connect using configuration from the environment.
    pub async fn from_env() -> Result<Self> {
        Self::connect(ClientConfig::from_env()).await
    }

    /// Use an already open store; `connector` resolves deferred arrays.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        connector: Arc<dyn StoreConnector>,
        config: ClientConfig,
    ) -> Result<Self> {
        config.validate().map_err(ClientError::InvalidConfig)?;
        Ok(Self {
            store,
            connector,
            namespace: config.namespace()?,
            location: config.location()?,
            decoders: AttributeDecoders::default(),
            config,
        })
    }

    pub fn with_decoders(mut self, decoders: AttributeDecoders) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Connector for resolving deferred data of cubes loaded by this client.
    pub fn connector(&self) -> &dyn StoreConnector {
        self.connector.as_ref()
    }

    /// Store one cube with its data.
    #[instrument(skip(self, cube), fields(name = %cube.name()))]
    pub async fn insert_one(&self, cube: &Cube) -> Result<DocumentId> {
        let document = encode_cube(cube, &self.config.encode_options())?;
        let id = self.store.put(&self.namespace, document).await?;
        info!(id = %id, namespace = %self.namespace, "Inserted cube");
        Ok(id)
    }

    /// Store each cube, carrying on past failures.
    #[instrument(skip(self, cubes), fields(count = cubes.len()))]
    pub async fn insert_many(&self, cubes: &[Cube]) -> BatchInsertReport {
        let mut report = BatchInsertReport::default();
        for (index, cube) in cubes.iter().enumerate() {
            match self.insert_one(cube).await {
                Ok(id) => report.inserted.push(id),
                Err(error) => {
                    warn!(index = index, name = %cube.name(), error = %error, "Could not insert cube");
                    report.failed.push(InsertFailure {
                        index,
                        name: cube.name().to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    /// The cube with `id`, or the first stored cube when `id` is `None`.
    pub async fn find_one(&self, id: Option<&DocumentId>) -> Result<Option<Cube>> {
        let document = match id {
            Some(id) => self.store.get_by_id(&self.namespace, id).await?,
            None => self.store.find_first(&self.namespace, &Filter::all()).await?,
        };
        document.map(|doc| self.decode(doc)).transpose()
    }

    /// The first cube matching `filter`.
    pub async fn query_one(&self, filter: &Filter) -> Result<Option<Cube>> {
        let document = self.store.find_first(&self.namespace, filter).await?;
        document.map(|doc| self.decode(doc)).transpose()
    }

    /// Every cube matching `filter`.
    #[instrument(skip(self, filter))]
    pub async fn query(&self, filter: &Filter) -> Result<Vec<Cube>> {
        let documents = self.store.query(&self.namespace, filter).await?;
        debug!(count = documents.len(), "Query matched");
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let documents = documents.into_iter().map(|doc| self.prepare(doc)).collect();
        Ok(CubeDecoder::new(documents)
            .with_options(self.decode_options())
            .with_decoders(self.decoders.clone())
            .load()?)
    }

    /// Fetch deferred data so `cube` holds its values.
    pub async fn realise(&self, cube: &mut Cube) -> Result<()> {
        Ok(cube.realise(self.connector.as_ref()).await?)
    }

    fn decode_options(&self) -> DecodeOptions {
        if self.config.lazy_data {
            DecodeOptions::lazy(self.location.clone())
        } else {
            DecodeOptions::default()
        }
    }

    /// In lazy mode the payload is dropped so the deferred handle is the
    /// only way to the values.
    fn prepare(&self, mut document: Document) -> Document {
        if self.config.lazy_data {
            if let Some(data) = document.get_mut("data").and_then(|d| d.as_object_mut()) {
                data.remove("data");
                data.remove("mask");
                data.remove("fill_value");
            }
        }
        document
    }

    fn decode(&self, document: Document) -> Result<Cube> {
        let document = self.prepare(document);
        Ok(cube_codec::decode_cube(&document, &self.decode_options(), &self.decoders)?)
    }
}

/// Stores metadata-only catalogue records and returns dataset references.
pub struct CatalogClient {
    store: Arc<dyn DocumentStore>,
    namespace: Namespace,
}

impl CatalogClient {
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let (store, _) = open_store(&config).await?;
        Self::new(store, &config)
    }

    pub fn new(store: Arc<dyn DocumentStore>, config: &ClientConfig) -> Result<Self> {
        config.validate().map_err(ClientError::InvalidConfig)?;
        Ok(Self {
            store,
            namespace: config.namespace()?,
        })
    }

    /// Catalogue the cubes loaded from `dataset_ref`.
    ///
    /// Records are keyed by metadata fingerprint and dataset reference, so
    /// cataloguing a dataset again replaces its records and leaves other
    /// datasets' records alone.
    #[instrument(skip(self, cubes), fields(count = cubes.len()))]
    pub async fn insert_dataset(&self, cubes: &[Cube], dataset_ref: &str) -> Result<Vec<DocumentId>> {
        let mut ids = Vec::with_capacity(cubes.len());
        for document in catalog_documents(cubes, dataset_ref)? {
            ids.push(self.store.put(&self.namespace, document).await?);
        }
        info!(count = ids.len(), namespace = %self.namespace, "Catalogued dataset");
        Ok(ids)
    }

    /// Dataset reference of the record with `id`, or of the first record.
    pub async fn find_one(&self, id: Option<&DocumentId>) -> Result<Option<String>> {
        let document = match id {
            Some(id) => self.store.get_by_id(&self.namespace, id).await?,
            None => self.store.find_first(&self.namespace, &Filter::all()).await?,
        };
        document.as_ref().map(dataset_ref).transpose()
    }

    pub async fn query_one(&self, filter: &Filter) -> Result<Option<String>> {
        let document = self.store.find_first(&self.namespace, filter).await?;
        document.as_ref().map(dataset_ref).transpose()
    }

    /// Dataset references of every matching record.
    pub async fn query(&self, filter: &Filter) -> Result<Vec<String>> {
        self.store
            .query(&self.namespace, filter)
            .await?
            .iter()
            .map(dataset_ref)
            .collect()
    }
}

fn dataset_ref(document: &Document) -> Result<String> {
    document
        .get(DATASET_REF_FIELD)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::MissingField(DATASET_REF_FIELD.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_ref() {
        let doc: Document = serde_json::from_value(json!({"dataset_ref": "/data/a.nc"})).unwrap();
        assert_eq!(dataset_ref(&doc).unwrap(), "/data/a.nc");
        assert!(matches!(
            dataset_ref(&Document::new()),
            Err(ClientError::MissingField(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_config() {
        let config = ClientConfig {
            collection: "a.b".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            CubeClient::connect(config).await,
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let client = CubeClient::connect(ClientConfig::default()).await.unwrap();
        assert!(client.find_one(None).await.unwrap().is_none());
        assert!(client.query(&Filter::all()).await.unwrap().is_empty());
    }
}
