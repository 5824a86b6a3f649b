//! Static image catalog plus the filter/sort glue that feeds the grid.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::Error;

/// One catalog entry. Identity is the `src` path; records are immutable once
/// constructed and no engine component mutates them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogFile {
    images: Vec<GalleryImage>,
}

/// The full, read-only image catalog for a session.
#[derive(Debug, Clone)]
pub struct Catalog {
    images: Vec<GalleryImage>,
}

impl Catalog {
    /// Construct a catalog, rejecting empty input and duplicate `src` paths.
    pub fn new(images: Vec<GalleryImage>) -> Result<Self, Error> {
        if images.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for image in &images {
            if !seen.insert(image.src.as_str()) {
                return Err(Error::DuplicateSrc(image.src.clone()));
            }
        }
        Ok(Self { images })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_yaml::from_str(&s)?;
        Self::new(file.images)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[GalleryImage] {
        &self.images
    }
}

/// Display order for a catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
    Title,
    Shuffled,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::NewestFirst
    }
}

/// Filter + sort applied to the catalog before it reaches the layout engine.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Keep only images tagged with this category, if set.
    pub category: Option<String>,
    pub order: SortOrder,
    /// Seed for [`SortOrder::Shuffled`]; `None` draws one from the OS.
    pub shuffle_seed: Option<u64>,
}

impl CatalogQuery {
    /// Produce the displayed list. Date sorts are stable with undated images
    /// last and `src` as the final tie-break, so identical queries yield
    /// identical orderings.
    #[must_use]
    pub fn apply(&self, catalog: &Catalog) -> Vec<GalleryImage> {
        let mut out: Vec<GalleryImage> = catalog
            .as_slice()
            .iter()
            .filter(|image| match &self.category {
                Some(wanted) => image.category.as_deref() == Some(wanted.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        match self.order {
            SortOrder::NewestFirst => {
                out.sort_by(|a, b| {
                    b.date
                        .cmp(&a.date)
                        .then_with(|| a.src.cmp(&b.src))
                });
            }
            SortOrder::OldestFirst => {
                out.sort_by(|a, b| match (a.date, b.date) {
                    (Some(da), Some(db)) => da.cmp(&db).then_with(|| a.src.cmp(&b.src)),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => a.src.cmp(&b.src),
                });
            }
            SortOrder::Title => {
                out.sort_by(|a, b| a.alt.cmp(&b.alt).then_with(|| a.src.cmp(&b.src)));
            }
            SortOrder::Shuffled => {
                let mut rng = match self.shuffle_seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                out.shuffle(&mut rng);
            }
        }
        out
    }
}
