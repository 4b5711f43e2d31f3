//! HTTP payload helpers.

mod image_file;

pub use image_file::{ImageFileError, load_image};
