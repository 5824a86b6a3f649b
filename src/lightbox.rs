//! Lightbox state: a snapshot of the displayed list plus a current index
//! that wraps circularly. Timer plumbing lives in the lightbox task; this
//! module is the pure state machine underneath it.

use crate::catalog::GalleryImage;

/// Full-screen viewer state while open. Construction snapshots the list the
/// grid was displaying at open time; navigation wraps modulo its length, so
/// `current_index` is in-range by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxState {
    images: Vec<GalleryImage>,
    current_index: usize,
    slideshow_playing: bool,
    controls_visible: bool,
}

impl LightboxState {
    /// Open on `index` into `images`. Returns `None` for an empty list or an
    /// out-of-range index; the grid cannot produce either, but a host might.
    #[must_use]
    pub fn open(images: Vec<GalleryImage>, index: usize) -> Option<Self> {
        if index >= images.len() {
            return None;
        }
        Some(Self {
            images,
            current_index: index,
            slideshow_playing: false,
            controls_visible: true,
        })
    }

    #[must_use]
    pub fn current(&self) -> &GalleryImage {
        &self.images[self.current_index]
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
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
    pub const fn is_slideshow_playing(&self) -> bool {
        self.slideshow_playing
    }

    #[must_use]
    pub const fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Advance to the next image, wrapping past the end.
    pub fn next(&mut self) {
        self.current_index = (self.current_index + 1) % self.images.len();
    }

    /// Step back to the previous image, wrapping before the start.
    pub fn prev(&mut self) {
        self.current_index = (self.current_index + self.images.len() - 1) % self.images.len();
    }

    /// Toggle slideshow playback; returns the new playing flag.
    pub fn toggle_slideshow(&mut self) -> bool {
        self.slideshow_playing = !self.slideshow_playing;
        self.slideshow_playing
    }

    pub fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }
}
