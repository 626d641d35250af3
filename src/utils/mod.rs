//! Utility modules for common operations

pub mod alpha;
pub mod filters;
pub mod validation;

pub use validation::{UploadValidator, ACCEPTED_FORMATS, MAX_UPLOAD_BYTES};
