//! Aspect-ratio resolution across the two parallel image path families.
//!
//! The catalog mixes "raw" paths (`/images/<category>/<file>.<ext>`) and
//! "optimized" paths (`/images/optimized/<category>/<file>.webp`), and not
//! every image has been through the metadata generator yet. Resolution walks
//! a fixed fallback chain and never fails.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::GalleryImage;
use crate::config::AspectOptions;
use crate::metadata::MetadataMap;

const RAW_PREFIX: &str = "/images/";
const OPTIMIZED_PREFIX: &str = "/images/optimized/";

/// Extensions the raw family may carry. The optimized name erases the
/// original extension, so the reverse rewrite tries each of these in order.
const RAW_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Return `true` if `path` belongs to the optimized family.
#[must_use]
pub fn is_optimized_path(path: &str) -> bool {
    path.starts_with(OPTIMIZED_PREFIX)
}

/// Rewrite a raw path to its optimized sibling, if `path` is a raw path.
#[must_use]
pub fn optimized_variant(path: &str) -> Option<String> {
    if is_optimized_path(path) {
        return None;
    }
    let rest = path.strip_prefix(RAW_PREFIX)?;
    let stem = strip_extension(rest);
    Some(format!("{OPTIMIZED_PREFIX}{stem}.webp"))
}

/// Rewrite an optimized path to its possible raw siblings, one candidate per
/// known raw extension, if `path` is an optimized path.
#[must_use]
pub fn raw_variants(path: &str) -> Vec<String> {
    let Some(rest) = path.strip_prefix(OPTIMIZED_PREFIX) else {
        return Vec::new();
    };
    let stem = strip_extension(rest);
    RAW_EXTENSIONS
        .iter()
        .map(|ext| format!("{RAW_PREFIX}{stem}.{ext}"))
        .collect()
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > name.rfind('/').map_or(0, |s| s + 1) => &name[..dot],
        _ => name,
    }
}

/// Resolves an image's aspect ratio through the fallback chain, memoizing per
/// `src` for the session. Resolution is a pure function of
/// `(src, metadata, category, defaults)`, so the memo never goes stale while
/// the catalog is static.
#[derive(Debug)]
pub struct AspectRatioResolver {
    defaults: AspectOptions,
    memo: HashMap<String, f32>,
}

impl AspectRatioResolver {
    #[must_use]
    pub fn new(defaults: AspectOptions) -> Self {
        Self {
            defaults,
            memo: HashMap::new(),
        }
    }

    /// Best-known aspect ratio for `image`. Always returns a ratio > 0.
    pub fn resolve(&mut self, image: &GalleryImage, metadata: &MetadataMap) -> f32 {
        if let Some(ratio) = self.memo.get(&image.src) {
            return *ratio;
        }
        let ratio = self.resolve_uncached(image, metadata);
        self.memo.insert(image.src.clone(), ratio);
        ratio
    }

    fn resolve_uncached(&self, image: &GalleryImage, metadata: &MetadataMap) -> f32 {
        if let Some(meta) = metadata.get(&image.src) {
            return meta.aspect_ratio;
        }
        if is_optimized_path(&image.src) {
            for candidate in raw_variants(&image.src) {
                if let Some(meta) = metadata.get(&candidate) {
                    return meta.aspect_ratio;
                }
            }
        } else if let Some(candidate) = optimized_variant(&image.src) {
            if let Some(meta) = metadata.get(&candidate) {
                return meta.aspect_ratio;
            }
        }
        if let Some(category) = &image.category {
            if let Some(ratio) = self.defaults.category_defaults.get(category) {
                debug!(src = %image.src, %category, ratio, "using category default ratio");
                return *ratio;
            }
        }
        debug!(src = %image.src, ratio = self.defaults.global_default_ratio, "using global default ratio");
        self.defaults.global_default_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ImageMetadata, Orientation};

    fn meta(ratio: f32) -> ImageMetadata {
        ImageMetadata {
            width: 1200,
            height: (1200.0 / ratio) as u32,
            aspect_ratio: ratio,
            orientation: if ratio > 1.0 {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
        }
    }

    fn img(src: &str, category: Option<&str>) -> GalleryImage {
        GalleryImage {
            src: src.to_string(),
            alt: String::new(),
            category: category.map(str::to_string),
            date: None,
            location: None,
        }
    }

    #[test]
    fn raw_path_rewrites_to_webp() {
        assert_eq!(
            optimized_variant("/images/travel/dunes.jpg").as_deref(),
            Some("/images/optimized/travel/dunes.webp")
        );
        assert_eq!(optimized_variant("/images/optimized/travel/dunes.webp"), None);
    }

    #[test]
    fn optimized_path_rewrites_across_raw_extensions() {
        assert_eq!(
            raw_variants("/images/optimized/travel/dunes.webp"),
            vec![
                "/images/travel/dunes.jpg",
                "/images/travel/dunes.jpeg",
                "/images/travel/dunes.png"
            ]
        );
        assert!(raw_variants("/images/travel/dunes.jpg").is_empty());
    }

    #[test]
    fn exact_match_wins() {
        let mut metadata = MetadataMap::new();
        metadata.insert("/images/travel/a.jpg".to_string(), meta(2.0));
        let mut resolver = AspectRatioResolver::new(AspectOptions::default());
        let ratio = resolver.resolve(&img("/images/travel/a.jpg", Some("portrait")), &metadata);
        assert!((ratio - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn optimized_src_falls_back_to_raw_entry() {
        let mut metadata = MetadataMap::new();
        metadata.insert("/images/travel/a.jpeg".to_string(), meta(1.25));
        let mut resolver = AspectRatioResolver::new(AspectOptions::default());
        let ratio = resolver.resolve(&img("/images/optimized/travel/a.webp", None), &metadata);
        assert!((ratio - 1.25).abs() < f32::EPSILON);
    }

    #[test]
    fn raw_src_falls_back_to_optimized_entry() {
        let mut metadata = MetadataMap::new();
        metadata.insert("/images/optimized/travel/a.webp".to_string(), meta(0.8));
        let mut resolver = AspectRatioResolver::new(AspectOptions::default());
        let ratio = resolver.resolve(&img("/images/travel/a.png", None), &metadata);
        assert!((ratio - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_metadata_uses_category_then_global_default() {
        let metadata = MetadataMap::new();
        let mut resolver = AspectRatioResolver::new(AspectOptions::default());
        let portrait = resolver.resolve(&img("/images/portrait/a.jpg", Some("portrait")), &metadata);
        assert!((portrait - 0.75).abs() < f32::EPSILON);
        let untagged = resolver.resolve(&img("/images/misc/b.jpg", None), &metadata);
        assert!((untagged - 1.5).abs() < f32::EPSILON);
        let unknown_tag = resolver.resolve(&img("/images/misc/c.jpg", Some("abstract")), &metadata);
        assert!((unknown_tag - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn resolution_is_memoized_per_src() {
        let mut metadata = MetadataMap::new();
        metadata.insert("/images/travel/a.jpg".to_string(), meta(2.0));
        let mut resolver = AspectRatioResolver::new(AspectOptions::default());
        let first = resolver.resolve(&img("/images/travel/a.jpg", None), &metadata);
        // Later lookups ignore changed metadata; the session memo answers.
        metadata.insert("/images/travel/a.jpg".to_string(), meta(3.0));
        let second = resolver.resolve(&img("/images/travel/a.jpg", None), &metadata);
        assert!((first - second).abs() < f32::EPSILON);
    }
}
