pub mod image;
pub mod upload;

pub use image::{ImageService, mime_from_bytes};
pub use upload::{DiskUploadService, UploadRequest, UploadService, UploadedFile};
