//! Cube <-> cube document.
//!
//! Document layout, in key order:
//!
//! ```text
//! standard_name, long_name, var_name   names or null
//! units                                {unit, calendar}
//! attributes                           free-form object
//! api_version                          version of this crate
//! data                                 bulk array (optional)
//! dim_coords                           {name: coordinate}, in axis order
//! aux_coords                           {name: coordinate}, scalars included
//! cell_methods                         {"0": cell method, ...} or null
//! ```
//!
//! Dimension coordinate names must be unique within a cube; a repeated name
//! overwrites the earlier entry.

use std::cell::OnceCell;
use std::path::Path;

use doc_store::{Document, DocumentId};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::codec::attributes::{encode_attributes, AttributeDecoders};
use crate::codec::bulk::{decode_array, decode_shape_and_dtype, encode_array};
use crate::codec::cell_method::{decode_cell_method, encode_cell_method};
use crate::codec::coord::{decode_coord, encode_coord};
use crate::codec::units::{decode_unit, encode_unit};
use crate::codec::{field_path, kind, optional_string, required, required_object};
use crate::config::{DecodeOptions, EncodeOptions};
use crate::error::{CodecError, Result};
use crate::proxy::RemoteArrayHandle;
use crate::types::coords::AxisSpec;
use crate::types::cube::{Cube, CubeData};

/// Written under `api_version`.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encode a cube.
///
/// Fails with `TypeMismatch` when data is requested from a cube whose data
/// is still deferred.
pub fn encode_cube(cube: &Cube, options: &EncodeOptions) -> Result<Document> {
    let mut doc = Document::new();
    doc.insert("standard_name".into(), Value::from(cube.standard_name.clone()));
    doc.insert("long_name".into(), Value::from(cube.long_name.clone()));
    doc.insert("var_name".into(), Value::from(cube.var_name.clone()));
    doc.insert("units".into(), encode_unit(&cube.units));
    doc.insert("attributes".into(), encode_attributes(&cube.attributes));
    doc.insert("api_version".into(), Value::from(API_VERSION));

    if options.include_data {
        let array = match cube.data() {
            CubeData::Realised(array) => array,
            CubeData::Deferred(_) => {
                return Err(CodecError::type_mismatch(
                    "data",
                    "an in-memory array; realise the cube before encoding its data",
                ))
            }
        };
        doc.insert("data".into(), Value::Object(encode_array(array)));
    }

    let mut dim_coords = Map::new();
    for (coord, axis) in cube.dim_coords() {
        let encoded = encode_coord(coord, &AxisSpec::Single(*axis), true, options.include_points)?;
        dim_coords.insert(coord.name().to_string(), encoded);
    }
    doc.insert("dim_coords".into(), Value::Object(dim_coords));

    let mut aux_coords = Map::new();
    for (coord, axes) in cube.aux_coords() {
        let encoded = encode_coord(coord, axes, false, options.include_points)?;
        aux_coords.insert(coord.name().to_string(), encoded);
    }
    doc.insert("aux_coords".into(), Value::Object(aux_coords));

    let cell_methods = if cube.cell_methods.is_empty() {
        Value::Null
    } else {
        Value::Object(
            cube.cell_methods
                .iter()
                .enumerate()
                .map(|(i, cm)| (i.to_string(), encode_cell_method(cm)))
                .collect(),
        )
    };
    doc.insert("cell_methods".into(), cell_methods);

    debug!(
        name = %cube.name(),
        include_data = options.include_data,
        include_points = options.include_points,
        "Encoded cube"
    );
    Ok(doc)
}

/// Encodes one cube once and hands out the cached document.
pub struct CubeEncoder<'a> {
    cube: &'a Cube,
    options: EncodeOptions,
    document: OnceCell<Document>,
}

impl<'a> CubeEncoder<'a> {
    pub fn new(cube: &'a Cube, options: EncodeOptions) -> Self {
        Self {
            cube,
            options,
            document: OnceCell::new(),
        }
    }

    pub fn cube(&self) -> &Cube {
        self.cube
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// The encoded document, computed on first call.
    pub fn document(&self) -> Result<&Document> {
        if let Some(doc) = self.document.get() {
            return Ok(doc);
        }
        let doc = encode_cube(self.cube, &self.options)?;
        Ok(self.document.get_or_init(|| doc))
    }

    pub fn into_document(self) -> Result<Document> {
        match self.document.into_inner() {
            Some(doc) => Ok(doc),
            None => encode_cube(self.cube, &self.options),
        }
    }

    pub fn dump_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self.document()?)?)
    }

    /// Write the document as pretty-printed JSON.
    #[instrument(skip(self), fields(name = %self.cube.name()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self.document()?)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Saved cube document");
        Ok(())
    }
}

fn decode_data(document: &Document, options: &DecodeOptions) -> Result<CubeData> {
    let location = options.location.as_ref();
    let data = match document.get("data") {
        Some(Value::Object(data)) => data,
        Some(Value::Null) | None => return Err(CodecError::missing_field("data")),
        Some(other) => {
            return Err(CodecError::type_mismatch(
                "data",
                format!("an object, found {}", kind(other)),
            ))
        }
    };

    if data.contains_key("data") {
        return Ok(CubeData::Realised(decode_array(data, "data")?));
    }
    match (location, DocumentId::of(document)) {
        (Some(location), Some(id)) => {
            let (shape, dtype) = decode_shape_and_dtype(data, "data")?;
            debug!(id = %id, shape = ?shape, "Deferring bulk data");
            Ok(CubeData::Deferred(RemoteArrayHandle::new(
                shape,
                dtype,
                location.clone(),
                id,
            )))
        }
        _ => Err(CodecError::missing_field("data.data")),
    }
}

fn cell_method_index(key: &str, field: &str) -> Result<usize> {
    key.parse()
        .map_err(|_| CodecError::invalid_value(field, format!("'{}' is not a position", key)))
}

/// Rebuild a cube from its document.
///
/// Dimension coordinates go back on their recorded axes, then auxiliary and
/// scalar coordinates in document order. Cell methods keep their positional
/// order.
pub fn decode_cube(
    document: &Document,
    options: &DecodeOptions,
    decoders: &AttributeDecoders,
) -> Result<Cube> {
    let units = decode_unit(required(document, "", "units")?, "units")?;
    let attributes = decoders.decode(required(document, "", "attributes")?, "attributes")?;
    let dim_docs = required_object(document, "", "dim_coords")?;
    let aux_docs = required_object(document, "", "aux_coords")?;

    let mut cube = Cube::new(decode_data(document, options)?, units);
    cube.standard_name = optional_string(document, "", "standard_name")?;
    cube.long_name = optional_string(document, "", "long_name")?;
    cube.var_name = optional_string(document, "", "var_name")?;
    cube.attributes = attributes;

    for (name, value) in dim_docs {
        let field = field_path("dim_coords", name);
        let (coord, axes) = decode_coord(value, &field, true, decoders)?;
        match axes {
            AxisSpec::Single(axis) => cube.add_dim_coord(coord, axis)?,
            other => {
                return Err(CodecError::axis_mismatch(
                    name.as_str(),
                    format!("dimension coordinate must span one axis, found {}", other),
                ))
            }
        }
    }

    for (name, value) in aux_docs {
        let field = field_path("aux_coords", name);
        let (coord, axes) = decode_coord(value, &field, false, decoders)?;
        cube.add_aux_coord(coord, axes)?;
    }

    match document.get("cell_methods") {
        None | Some(Value::Null) => {}
        Some(Value::Object(methods)) => {
            let mut ordered = methods
                .iter()
                .map(|(key, value)| {
                    let field = field_path("cell_methods", key);
                    Ok::<_, CodecError>((cell_method_index(key, &field)?, field, value))
                })
                .collect::<Result<Vec<_>>>()?;
            ordered.sort_by_key(|(index, _, _)| *index);
            for (_, field, value) in ordered {
                cube.add_cell_method(decode_cell_method(value, &field)?);
            }
        }
        Some(other) => {
            return Err(CodecError::type_mismatch(
                "cell_methods",
                format!("an object or null, found {}", kind(other)),
            ))
        }
    }

    debug!(
        name = %cube.name(),
        shape = ?cube.shape(),
        deferred = cube.has_deferred_data(),
        "Decoded cube"
    );
    Ok(cube)
}

/// Decodes a batch of documents into cubes.
#[derive(Debug, Clone)]
pub struct CubeDecoder {
    documents: Vec<Document>,
    options: DecodeOptions,
    decoders: AttributeDecoders,
}

impl CubeDecoder {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            options: DecodeOptions::default(),
            decoders: AttributeDecoders::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_decoders(mut self, decoders: AttributeDecoders) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Decode every document; the first failure aborts the batch.
    pub fn load(&self) -> Result<Vec<Cube>> {
        if self.documents.is_empty() {
            return Err(CodecError::invalid_value("documents", "no documents to decode"));
        }
        self.documents
            .iter()
            .map(|doc| decode_cube(doc, &self.options, &self.decoders))
            .collect()
    }
}
