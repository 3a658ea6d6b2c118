//! Store cubes in a document store and load them back.
//!
//! - [`CubeClient`]: whole cubes in, cubes out; with `lazy_data` the loaded
//!   cubes hold deferred handles that fetch their values when indexed
//! - [`CatalogClient`]: metadata-only records in, dataset references out
//! - [`files`]: the same documents as JSON files
//!
//! Configuration comes from [`ClientConfig`], usually via
//! [`ClientConfig::from_env`].

pub mod client;
pub mod config;
pub mod error;
pub mod files;

pub use client::{BatchInsertReport, CatalogClient, CubeClient, InsertFailure};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use files::{load_cube_file, save_catalog_files, save_cube_file};
