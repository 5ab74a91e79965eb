use std::path::{Path, PathBuf};

use crate::error::SquishError;

/// A local file chosen for compression.
///
/// Holds the metadata the selection view renders plus the path the bytes are
/// read from at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    /// Declared media type. May be missing when the type cannot be guessed.
    pub media_type: Option<String>,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        media_type: Option<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            media_type,
            path: path.into(),
        }
    }

    /// Build a selection from a path on disk, guessing the media type from the
    /// extension. Fails if the path is not a readable regular file.
    pub fn from_path(path: &Path) -> Result<Self, SquishError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(SquishError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();
        let media_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Ok(Self::new(name, metadata.len(), media_type, path))
    }

    /// Size in kilobytes, fractional.
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    /// Media type sent with the multipart part.
    pub fn media_type_or_default(&self) -> &str {
        self.media_type
            .as_deref()
            .filter(|mt| !mt.is_empty())
            .unwrap_or("application/octet-stream")
    }
}
