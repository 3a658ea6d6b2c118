//! Cube <-> JSON document codec.
//!
//! A cube is an n-dimensional array with a name, units, attributes, cell
//! methods and labelled coordinates. This crate:
//! - encodes cubes as JSON documents and rebuilds them exactly
//! - keeps masked arrays and their fill values through a round trip
//! - defers fetching bulk data through a [`RemoteArrayHandle`] when a
//!   document is read from a store without its payload
//! - projects cubes to metadata-only catalogue records with a fingerprint
//!
//! ```no_run
//! use cube_codec::{decode_cube, encode_cube, AttributeDecoders, DecodeOptions, EncodeOptions};
//! # fn run(cube: &cube_codec::Cube) -> cube_codec::Result<()> {
//! let doc = encode_cube(cube, &EncodeOptions::default())?;
//! let back = decode_cube(&doc, &DecodeOptions::default(), &AttributeDecoders::default())?;
//! assert_eq!(&back, cube);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod proxy;
pub mod types;

pub use catalog::{
    catalog_documents, catalog_id, indexed_filename, mime_type, save_documents, DATASET_REF_FIELD,
    MIME_TYPE_FIELD,
};
pub use codec::attributes::{AttributeDecoder, AttributeDecoders};
pub use codec::cube::{decode_cube, encode_cube, CubeDecoder, CubeEncoder, API_VERSION};
pub use config::{DecodeOptions, EncodeOptions};
pub use error::{CodecError, Result};
pub use fingerprint::metadata_hash;
pub use proxy::{RemoteArrayHandle, StoreLocation};
pub use types::*;
