//! Client configuration.

use cube_codec::{EncodeOptions, StoreLocation};
use doc_store::Namespace;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Where cubes are stored and how they are read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Store address, e.g. `memory:///`, `file:///var/cubes`, `s3://bucket/prefix`.
    pub store_url: String,

    /// Database name.
    pub database: String,

    /// Collection name within the database.
    pub collection: String,

    /// Decode documents with deferred data, fetched when indexed.
    pub lazy_data: bool,

    /// Store coordinate points alongside their statistics.
    pub include_points: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_url: "memory:///".to_string(),
            database: "metadatabase".to_string(),
            collection: "cubes".to_string(),
            lazy_data: false,
            include_points: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CUBE_STORE_URL") {
            config.store_url = val;
        }

        if let Ok(val) = std::env::var("CUBE_DATABASE") {
            config.database = val;
        }

        if let Ok(val) = std::env::var("CUBE_COLLECTION") {
            config.collection = val;
        }

        if let Ok(val) = std::env::var("CUBE_LAZY_DATA") {
            config.lazy_data = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("CUBE_INCLUDE_POINTS") {
            config.include_points = parse_flag(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.store_url.is_empty() {
            return Err("store_url must not be empty".to_string());
        }

        for (label, name) in [("database", &self.database), ("collection", &self.collection)] {
            if name.is_empty() {
                return Err(format!("{} must not be empty", label));
            }
            if name.contains('.') {
                return Err(format!("{} '{}' must not contain '.'", label, name));
            }
        }

        Ok(())
    }

    pub fn namespace(&self) -> Result<Namespace> {
        Namespace::new(&self.database, &self.collection)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }

    pub fn location(&self) -> Result<StoreLocation> {
        Ok(StoreLocation::new(self.store_url.clone(), self.namespace()?))
    }

    /// Options for full documents written by the client.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            include_data: true,
            include_points: self.include_points,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}
