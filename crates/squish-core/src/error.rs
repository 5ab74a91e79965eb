//! Error types module
//!
//! Client-side validation failures. Each variant's `Display` is the exact
//! message shown in the status region, so callers can render `to_string()`.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SquishError {
    #[error("Unsupported file type. Please upload PDF, JPG, PNG, or WEBP.")]
    UnsupportedFileType { name: String },

    #[error("Target size should be smaller than the original size for compression.")]
    TargetNotSmaller { target_kb: f64, original_kb: f64 },

    #[error("Please enter a target size greater than zero.")]
    InvalidTarget(String),

    #[error("Invalid size unit: {0}. Expected KB or MB")]
    InvalidUnit(String),

    #[error("File size exceeds maximum allowed size of {} MB", .limit / 1024 / 1024)]
    FileTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
