//! Channel message types joining the engine tasks and their host.

use std::collections::BTreeSet;

use crate::catalog::GalleryImage;
use crate::layout::LayoutItem;
use crate::share::ShareTarget;

/// Keyboard input forwarded by the host. Only meaningful while the lightbox
/// is open; the lightbox task ignores keys otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Escape,
    Space,
}

/// Inputs to the incremental loader task.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// The sentinel near the end of rendered content entered the viewport.
    Proximity,
    /// The displayed list was replaced (filter/sort change).
    CatalogReplaced { total: usize },
}

/// Loader output: the slice of the catalog the grid should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleSlice {
    pub visible_count: usize,
    pub has_more: bool,
}

/// Inputs to the gallery view task.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    ViewportResized { width: f32 },
    VisibleCountChanged { count: usize },
    CatalogReplaced { images: Vec<GalleryImage> },
    /// An individual image download failed; the cell stays in place.
    CellFailed { src: String },
}

/// One complete layout pass, ready to render.
#[derive(Debug, Clone)]
pub struct GridUpdate {
    pub items: Vec<LayoutItem>,
    pub total_height: f32,
    pub column_count: usize,
    /// Srcs whose downloads failed; their cells render a broken state but
    /// keep their positions.
    pub broken: BTreeSet<String>,
}

/// Commands into the lightbox task.
#[derive(Debug, Clone)]
pub enum LightboxCommand {
    Open {
        images: Vec<GalleryImage>,
        index: usize,
    },
    Next,
    Prev,
    ToggleSlideshow,
    Close,
    Key(Key),
    PointerMoved,
    PointerEnteredControls,
    PointerLeftControls,
    Share(ShareTarget),
}

/// Lightbox output after every observable change; `None` means closed.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxUpdate(pub Option<LightboxSnapshot>);

#[derive(Debug, Clone, PartialEq)]
pub struct LightboxSnapshot {
    pub image: GalleryImage,
    pub current_index: usize,
    pub total: usize,
    pub slideshow_playing: bool,
    pub controls_visible: bool,
}
