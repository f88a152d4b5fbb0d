// Process-local state shared by the view models

pub mod image_cache;
pub mod preferences;

pub use image_cache::{CoverImage, ImageCache};
pub use preferences::PreferenceStore;
