//! Use cases
//!
//! Operations that span a port and the executor without belonging to a
//! single screen.

mod upload_image;

pub use upload_image::UploadImage;
