//! Checks run right before a submission leaves the client.

use crate::error::SquishError;
use crate::models::{SelectedFile, TargetSize};

/// The normalized target must be strictly below the file's size in KB.
pub fn ensure_target_smaller(file: &SelectedFile, target: &TargetSize) -> Result<(), SquishError> {
    let target_kb = target.to_kb();
    let original_kb = file.size_kb();
    if target_kb >= original_kb {
        return Err(SquishError::TargetNotSmaller {
            target_kb,
            original_kb,
        });
    }
    Ok(())
}

pub fn ensure_within_upload_limit(file: &SelectedFile, limit: u64) -> Result<(), SquishError> {
    if file.size > limit {
        return Err(SquishError::FileTooLarge {
            size: file.size,
            limit,
        });
    }
    Ok(())
}

/// Reduce a server-suggested filename to a single safe path component.
///
/// Directory parts are dropped, and names that would escape the output
/// directory or are empty fall back to `fallback`.
pub fn sanitize_filename(filename: &str, fallback: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    if last.is_empty() || last == "." || last == ".." {
        return fallback.to_string();
    }

    last.chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| if c.is_control() { '_' } else { c })
        .collect()
}
