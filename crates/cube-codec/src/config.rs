//! Encode and decode options.

use serde::{Deserialize, Serialize};

use crate::proxy::StoreLocation;

/// What goes into an encoded cube document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Write the bulk array under `data`.
    pub include_data: bool,
    /// Write coordinate `points`; statistics are always written.
    pub include_points: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            include_data: true,
            include_points: true,
        }
    }
}

impl EncodeOptions {
    /// Names, units, statistics and structure only.
    pub fn metadata_only() -> Self {
        Self {
            include_data: false,
            include_points: false,
        }
    }
}

/// Where decoded documents came from.
///
/// With a location, documents without inline data decode to cubes holding a
/// deferred handle instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    pub location: Option<StoreLocation>,
}

impl DecodeOptions {
    pub fn lazy(location: StoreLocation) -> Self {
        Self {
            location: Some(location),
        }
    }
}
