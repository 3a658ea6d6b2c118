//! Document-store abstractions for cube documents.
//!
//! Provides the small contract the cube codec needs from a document database:
//! - `put` a document into a `database.collection` namespace and get its id back
//! - fetch a single document by id
//! - query documents with an equality filter
//!
//! Two backends are included: an in-memory store and a store that keeps each
//! document as a JSON object in any `object_store` backend (memory, local
//! filesystem, S3, HTTP).

pub mod document;
pub mod error;
pub mod memory;
pub mod object_store;
pub mod store;

pub use self::object_store::{ObjectDocumentStore, ObjectStoreConnector};
pub use document::{Document, DocumentId, Filter, Namespace, ID_FIELD};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryDocumentStore;
pub use store::{DocumentStore, FixedConnector, StoreConnector};
