//! Validation modules

pub mod file_type;
pub mod submission;

pub use file_type::{
    ensure_supported, is_supported, ACCEPTED_EXTENSIONS, ACCEPTED_MEDIA_TYPES,
};
pub use submission::{ensure_target_smaller, ensure_within_upload_limit, sanitize_filename};
