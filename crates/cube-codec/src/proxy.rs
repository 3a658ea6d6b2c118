//! Lazy handle to a bulk array held in a document store.
//!
//! A [`RemoteArrayHandle`] knows the shape and element type of an array and
//! where its document lives, but holds no values. [`RemoteArrayHandle::resolve`]
//! is the one place that touches the store: it connects, fetches the document,
//! and decodes its `data` sub-document. Every call fetches again; there is no
//! cache, no retry and no lock, so callers wanting repeated access should
//! resolve once and keep the array.

use doc_store::{DocumentId, Namespace, StoreConnector};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::codec::bulk::decode_array;
use crate::codec::required_object;
use crate::error::{CodecError, Result};
use crate::types::array::{DataType, NdArray};
use crate::types::selector::Selector;

/// Where cube documents are stored: a store address and a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreLocation {
    pub address: String,
    pub namespace: Namespace,
}

impl StoreLocation {
    pub fn new(address: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            address: address.into(),
            namespace,
        }
    }
}

/// Shape, element type and location of a stored array.
///
/// The serialized form is exactly these five fields, so a handle can be
/// persisted and rebuilt without any open connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteArrayHandle {
    shape: Vec<usize>,
    dtype: DataType,
    address: String,
    namespace: Namespace,
    id: DocumentId,
}

impl RemoteArrayHandle {
    /// Create a handle. Performs no I/O.
    pub fn new(shape: Vec<usize>, dtype: DataType, location: StoreLocation, id: DocumentId) -> Self {
        Self {
            shape,
            dtype,
            address: location.address,
            namespace: location.namespace,
            id,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn location(&self) -> StoreLocation {
        StoreLocation::new(self.address.clone(), self.namespace.clone())
    }

    /// Fetch and decode the full array.
    ///
    /// Fails with `NotFound` if the document is gone and `ShapeMismatch` if
    /// the stored array no longer has the declared shape.
    #[instrument(skip(self, connector), fields(namespace = %self.namespace, id = %self.id))]
    pub async fn resolve(&self, connector: &dyn StoreConnector) -> Result<NdArray> {
        let store = connector.connect(&self.address).await?;
        let document = store
            .get_by_id(&self.namespace, &self.id)
            .await?
            .ok_or_else(|| CodecError::not_found(self.namespace.to_string(), self.id.to_string()))?;

        let data = required_object(&document, "", "data")?;
        let array = decode_array(data, "data")?;
        if array.shape() != self.shape.as_slice() {
            return Err(CodecError::shape_mismatch("data.shape", &self.shape, array.shape()));
        }
        debug!(shape = ?self.shape, dtype = %self.dtype, "Resolved remote array");
        Ok(array.cast(self.dtype))
    }

    /// Resolve, then apply `selector` to the fetched array.
    pub async fn index(&self, connector: &dyn StoreConnector, selector: &Selector) -> Result<NdArray> {
        self.resolve(connector).await?.select(selector)
    }
}
