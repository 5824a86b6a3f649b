use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Path to the JSON dimension table produced by the offline image pipeline.
    pub metadata_path: PathBuf,
    /// Canonical page URL used when building outbound share links.
    pub page_url: String,
    /// Optional deterministic seed for the shuffled sort order.
    pub shuffle_seed: Option<u64>,
    /// Masonry grid geometry.
    pub layout: LayoutOptions,
    /// Incremental reveal pacing.
    pub loader: LoaderOptions,
    /// Lightbox timing.
    pub lightbox: LightboxOptions,
    /// Aspect-ratio fallbacks for images absent from the metadata table.
    pub aspect: AspectOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.layout.validate()?;
        self.loader.validate()?;
        self.lightbox.validate()?;
        self.aspect.validate()?;
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("images-metadata.json"),
            page_url: String::from("https://localhost/gallery"),
            shuffle_seed: None,
            layout: LayoutOptions::default(),
            loader: LoaderOptions::default(),
            lightbox: LightboxOptions::default(),
            aspect: AspectOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutOptions {
    /// Column count for the widest viewport tier; narrower tiers reduce it.
    pub column_count: usize,
    /// Gap between columns and between stacked cells, in pixels.
    pub column_gap: f32,
}

impl LayoutOptions {
    const fn default_column_count() -> usize {
        3
    }

    const fn default_column_gap() -> f32 {
        16.0
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.column_count >= 1, "layout.column-count must be >= 1");
        ensure!(self.column_gap >= 0.0, "layout.column-gap must be >= 0");
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            column_count: Self::default_column_count(),
            column_gap: Self::default_column_gap(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoaderOptions {
    /// Number of images revealed before any scrolling happens.
    pub initial_batch: usize,
    /// Number of images added per proximity trigger.
    pub batch_size: usize,
    /// Debounce window between a proximity signal and the count bump.
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
}

impl LoaderOptions {
    const fn default_initial_batch() -> usize {
        50
    }

    const fn default_batch_size() -> usize {
        12
    }

    const fn default_debounce() -> Duration {
        Duration::from_millis(200)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.initial_batch > 0, "loader.initial-batch must be > 0");
        ensure!(self.batch_size > 0, "loader.batch-size must be > 0");
        Ok(())
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            initial_batch: Self::default_initial_batch(),
            batch_size: Self::default_batch_size(),
            debounce: Self::default_debounce(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LightboxOptions {
    /// Time between automatic slideshow advances.
    #[serde(with = "humantime_serde")]
    pub slideshow_interval: Duration,
    /// Pointer idle time before on-screen controls hide themselves.
    #[serde(with = "humantime_serde")]
    pub controls_hide_delay: Duration,
}

impl LightboxOptions {
    const fn default_slideshow_interval() -> Duration {
        Duration::from_secs(3)
    }

    const fn default_controls_hide_delay() -> Duration {
        Duration::from_secs(2)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.slideshow_interval > Duration::ZERO,
            "lightbox.slideshow-interval must be positive"
        );
        ensure!(
            self.controls_hide_delay > Duration::ZERO,
            "lightbox.controls-hide-delay must be positive"
        );
        Ok(())
    }
}

impl Default for LightboxOptions {
    fn default() -> Self {
        Self {
            slideshow_interval: Self::default_slideshow_interval(),
            controls_hide_delay: Self::default_controls_hide_delay(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AspectOptions {
    /// Ratio used when no metadata and no category default applies.
    pub global_default_ratio: f32,
    /// Per-category default ratios, keyed by the catalog's category tags.
    pub category_defaults: BTreeMap<String, f32>,
}

impl AspectOptions {
    const fn default_global_ratio() -> f32 {
        1.5
    }

    fn default_category_defaults() -> BTreeMap<String, f32> {
        BTreeMap::from([
            (String::from("portrait"), 0.75),
            (String::from("landscape"), 1.5),
        ])
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.global_default_ratio > 0.0,
            "aspect.global-default-ratio must be positive"
        );
        for (category, ratio) in &self.category_defaults {
            ensure!(
                *ratio > 0.0,
                "aspect.category-defaults.{category} must be positive"
            );
        }
        Ok(())
    }
}

impl Default for AspectOptions {
    fn default() -> Self {
        Self {
            global_default_ratio: Self::default_global_ratio(),
            category_defaults: Self::default_category_defaults(),
        }
    }
}
