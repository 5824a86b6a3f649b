//! Session-scoped store for the offline-generated image dimension table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Orientation tag carried by the metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

/// Dimensions for one image path, as produced by the offline pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f32,
    pub orientation: Orientation,
}

impl ImageMetadata {
    fn is_plausible(&self) -> bool {
        self.width > 0 && self.height > 0 && self.aspect_ratio > 0.0
    }
}

#[derive(Debug, Deserialize)]
struct MetadataDocument {
    images: HashMap<String, ImageMetadata>,
}

pub type MetadataMap = HashMap<String, ImageMetadata>;

/// Loads the metadata document at most once per process lifetime and serves
/// the cached mapping thereafter. Concurrent callers of [`MetadataStore::load`]
/// share the single in-flight read; any failure degrades to an empty mapping
/// rather than an error so rendering is never blocked.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    cell: OnceCell<MetadataMap>,
}

impl MetadataStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Load (once) and return the dimension table.
    pub async fn load(&self) -> &MetadataMap {
        self.cell
            .get_or_init(|| read_document(self.path.clone()))
            .await
    }

    /// The cached mapping, if a load has already completed.
    #[must_use]
    pub fn cached(&self) -> Option<&MetadataMap> {
        self.cell.get()
    }
}

async fn read_document(path: PathBuf) -> MetadataMap {
    match try_read_document(&path).await {
        Ok(map) => {
            debug!(entries = map.len(), path = %path.display(), "metadata table loaded");
            map
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "metadata unavailable; using defaults");
            MetadataMap::new()
        }
    }
}

async fn try_read_document(path: &Path) -> anyhow::Result<MetadataMap> {
    let bytes = tokio::fs::read(path).await?;
    let doc: MetadataDocument = serde_json::from_slice(&bytes)?;
    let total = doc.images.len();
    let map: MetadataMap = doc
        .images
        .into_iter()
        .filter(|(path, meta)| {
            if meta.is_plausible() {
                true
            } else {
                warn!(%path, "dropping metadata entry with non-positive dimensions");
                false
            }
        })
        .collect();
    if map.len() < total {
        debug!(kept = map.len(), total, "metadata entries filtered");
    }
    Ok(map)
}
