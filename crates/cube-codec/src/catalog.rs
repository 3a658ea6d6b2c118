//! Metadata-only catalogue records.
//!
//! A catalogue record is a cube document without bulk data or coordinate
//! points, tagged with the dataset it came from. Its `_id` pairs the cube's
//! metadata fingerprint with a hash of the dataset reference: cataloguing
//! the same dataset twice replaces its earlier records, while identical
//! cubes from different datasets keep separate records.

use std::path::{Path, PathBuf};

use doc_store::{Document, ID_FIELD};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::codec::cube::encode_cube;
use crate::config::EncodeOptions;
use crate::error::Result;
use crate::fingerprint::metadata_hash;
use crate::types::cube::Cube;

pub const DATASET_REF_FIELD: &str = "dataset_ref";
pub const MIME_TYPE_FIELD: &str = "mime_type";

/// Lower-cased file extension of a dataset reference, without the dot.
pub fn mime_type(dataset_ref: &str) -> String {
    Path::new(dataset_ref)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Record id of `cube` catalogued from `dataset_ref`.
pub fn catalog_id(cube: &Cube, dataset_ref: &str) -> String {
    let dataset = Uuid::new_v5(&Uuid::NAMESPACE_URL, dataset_ref.as_bytes());
    format!("{}_{}", metadata_hash(cube), dataset.simple())
}

/// One catalogue record per cube.
pub fn catalog_documents(cubes: &[Cube], dataset_ref: &str) -> Result<Vec<Document>> {
    let mime = mime_type(dataset_ref);
    cubes
        .iter()
        .map(|cube| -> Result<Document> {
            let mut doc = encode_cube(cube, &EncodeOptions::metadata_only())?;
            doc.insert(DATASET_REF_FIELD.into(), Value::from(dataset_ref));
            doc.insert(MIME_TYPE_FIELD.into(), Value::from(mime.as_str()));
            doc.insert(ID_FIELD.into(), Value::from(catalog_id(cube, dataset_ref)));
            Ok(doc)
        })
        .collect()
}

/// File name for document `idx` of `total`.
///
/// A missing extension becomes `.json`; with more than one document the
/// index is appended to the stem (`cube_0.json`, `cube_1.json`).
pub fn indexed_filename(filename: &Path, idx: usize, total: usize) -> PathBuf {
    let ext = filename
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "json".to_string());
    let stem = filename
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if total > 1 {
        format!("{}_{}.{}", stem, idx, ext)
    } else {
        format!("{}.{}", stem, ext)
    };
    filename.with_file_name(name)
}

/// Write each document as pretty-printed JSON; returns the paths written.
#[instrument(skip(documents), fields(count = documents.len()))]
pub fn save_documents(documents: &[Document], filename: &Path) -> Result<Vec<PathBuf>> {
    let total = documents.len();
    documents
        .iter()
        .enumerate()
        .map(|(idx, doc)| -> Result<PathBuf> {
            let path = indexed_filename(filename, idx, total);
            std::fs::write(&path, serde_json::to_string_pretty(doc)?)?;
            debug!(path = %path.display(), "Saved document");
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::array::ArrayData;
    use crate::types::coords::Coord;
    use crate::types::units::Unit;
    use ndarray::{ArrayD, IxDyn};
    use serde_json::json;

    fn cube(name: &str) -> Cube {
        let data = ArrayData::from(ArrayD::<f64>::zeros(IxDyn(&[3])));
        let mut cube = Cube::new(data, Unit::new("K").unwrap()).with_long_name(name);
        cube.add_dim_coord(
            Coord::from_vec(vec![1.0, 2.0, 3.0], Unit::new("m").unwrap()).with_standard_name("height"),
            0,
        )
        .unwrap();
        cube
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("/data/ukv/file.NC"), "nc");
        assert_eq!(mime_type("s3://bucket/run.pp"), "pp");
        assert_eq!(mime_type("no_extension"), "");
    }

    #[test]
    fn test_catalog_documents() {
        let docs = catalog_documents(&[cube("a"), cube("b")], "/data/run.nc").unwrap();
        assert_eq!(docs.len(), 2);
        let doc = &docs[0];
        assert!(doc.get("data").is_none());
        assert!(doc["dim_coords"]["height"].get("points").is_none());
        assert_eq!(doc["dim_coords"]["height"]["npoints"], json!(3));
        assert_eq!(doc[DATASET_REF_FIELD], json!("/data/run.nc"));
        assert_eq!(doc[MIME_TYPE_FIELD], json!("nc"));
        assert_eq!(doc[ID_FIELD], json!(catalog_id(&cube("a"), "/data/run.nc")));
        assert_ne!(docs[0][ID_FIELD], docs[1][ID_FIELD]);
    }

    #[test]
    fn test_catalog_ids_are_per_dataset() {
        let first = catalog_documents(&[cube("a")], "/data/run_001.pp").unwrap();
        let again = catalog_documents(&[cube("a")], "/data/run_001.pp").unwrap();
        let second = catalog_documents(&[cube("a")], "/data/run_002.pp").unwrap();

        assert_eq!(first[0][ID_FIELD], again[0][ID_FIELD]);
        assert_ne!(first[0][ID_FIELD], second[0][ID_FIELD]);

        let id = first[0][ID_FIELD].as_str().unwrap();
        assert!(id.starts_with(&metadata_hash(&cube("a"))));
    }

    #[test]
    fn test_indexed_filename() {
        let base = Path::new("/tmp/out/cube");
        assert_eq!(indexed_filename(base, 0, 1), PathBuf::from("/tmp/out/cube.json"));
        assert_eq!(indexed_filename(base, 1, 2), PathBuf::from("/tmp/out/cube_1.json"));
        assert_eq!(
            indexed_filename(Path::new("meta.txt"), 0, 3),
            PathBuf::from("meta_0.txt")
        );
    }

    #[test]
    fn test_save_documents() {
        let dir = tempfile::tempdir().unwrap();
        let docs = catalog_documents(&[cube("a"), cube("b")], "run.pp").unwrap();
        let paths = save_documents(&docs, &dir.path().join("catalog")).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("catalog_1.json"));
        let text = std::fs::read_to_string(&paths[0]).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, docs[0]);
    }
}
