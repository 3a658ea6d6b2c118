//! Error types for cube encoding and decoding.
//!
//! Every variant names the offending field as a dotted document path
//! (for example `dim_coords.latitude.coord_system.name`) or the coordinate
//! concerned, so a caller can locate the malformed sub-document.

use doc_store::StoreError;
use thiserror::Error;

/// Errors that can occur while encoding, decoding or resolving cubes.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A unit string the unit grammar cannot parse.
    #[error("malformed unit '{unit}' at {field}: {message}")]
    MalformedUnit {
        field: String,
        unit: String,
        message: String,
    },

    /// A coordinate-system name outside the supported set.
    #[error("unknown coordinate system '{name}' at {field}")]
    UnknownCoordinateSystem { field: String, name: String },

    /// Recorded shape and actual contents disagree.
    #[error("shape mismatch at {field}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// A required document field is absent.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A referenced document no longer exists in the store.
    #[error("document '{id}' not found in {namespace}")]
    NotFound { namespace: String, id: String },

    /// A value of the wrong kind for its position.
    #[error("type mismatch at {field}: expected {expected}")]
    TypeMismatch { field: String, expected: String },

    /// A well-typed value that is not allowed.
    #[error("invalid value at {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A coordinate placed on axes that do not fit the cube.
    #[error("axis mismatch for coordinate '{coord}': {message}")]
    AxisMismatch { coord: String, message: String },

    /// An index or slice that cannot be applied to an array.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Create a MalformedUnit error.
    pub fn malformed_unit(
        field: impl Into<String>,
        unit: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedUnit {
            field: field.into(),
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Create an UnknownCoordinateSystem error.
    pub fn unknown_coord_system(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownCoordinateSystem {
            field: field.into(),
            name: name.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(field: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a NotFound error.
    pub fn not_found(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Create an InvalidValue error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an AxisMismatch error.
    pub fn axis_mismatch(coord: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AxisMismatch {
            coord: coord.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidSelector error.
    pub fn invalid_selector(msg: impl Into<String>) -> Self {
        Self::InvalidSelector(msg.into())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
