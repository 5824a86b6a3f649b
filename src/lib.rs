pub mod aspect;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod layout;
pub mod lightbox;
pub mod metadata;
pub mod share;
pub mod signal;
pub mod tasks {
    pub mod lightbox;
    pub mod loader;
    pub mod view;
}

pub use error::Error;
