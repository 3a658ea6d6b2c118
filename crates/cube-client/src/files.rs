//! Cube documents on the local filesystem.

use std::path::{Path, PathBuf};

use cube_codec::{
    catalog_documents, decode_cube, save_documents, AttributeDecoders, Cube, CubeEncoder,
    DecodeOptions, EncodeOptions,
};
use doc_store::Document;
use tracing::{debug, instrument};

use crate::error::Result;

/// Write a cube as a pretty-printed JSON document.
#[instrument(skip(cube), fields(name = %cube.name()))]
pub async fn save_cube_file(cube: &Cube, path: &Path, options: EncodeOptions) -> Result<()> {
    let encoder = CubeEncoder::new(cube, options);
    let json = serde_json::to_vec_pretty(encoder.document()?)?;
    tokio::fs::write(path, &json).await?;
    debug!(size = json.len(), "Saved cube file");
    Ok(())
}

/// Read a cube saved with [`save_cube_file`]. The file must carry its data.
#[instrument]
pub async fn load_cube_file(path: &Path) -> Result<Cube> {
    let bytes = tokio::fs::read(path).await?;
    debug!(size = bytes.len(), "Read cube file");
    let document: Document = serde_json::from_slice(&bytes)?;
    Ok(decode_cube(
        &document,
        &DecodeOptions::default(),
        &AttributeDecoders::default(),
    )?)
}

/// Write catalogue records for the cubes of one dataset, one file per cube.
pub fn save_catalog_files(cubes: &[Cube], dataset_ref: &str, filename: &Path) -> Result<Vec<PathBuf>> {
    let documents = catalog_documents(cubes, dataset_ref)?;
    Ok(save_documents(&documents, filename)?)
}
