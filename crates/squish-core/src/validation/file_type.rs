//! File acceptance rules for the selection step.

use crate::error::SquishError;
use crate::models::SelectedFile;

pub const ACCEPTED_MEDIA_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/png", "image/webp"];

pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "webp"];

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; q=1" -> "image/jpeg").
fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_lowercase()
}

fn has_accepted_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// A file is supported when its declared media type is accepted, or, since the
/// declared type is often empty or wrong, when its name ends in an accepted
/// extension.
pub fn is_supported(name: &str, media_type: Option<&str>) -> bool {
    let by_type = media_type
        .map(normalize_media_type)
        .is_some_and(|mt| ACCEPTED_MEDIA_TYPES.contains(&mt.as_str()));

    by_type || has_accepted_extension(name)
}

pub fn ensure_supported(file: &SelectedFile) -> Result<(), SquishError> {
    if is_supported(&file.name, file.media_type.as_deref()) {
        Ok(())
    } else {
        Err(SquishError::UnsupportedFileType {
            name: file.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_by_media_type() {
        assert!(is_supported("upload", Some("application/pdf")));
        assert!(is_supported("upload", Some("image/webp")));
        assert!(is_supported("upload", Some("IMAGE/PNG; charset=binary")));
    }

    #[test]
    fn accepts_by_extension_when_type_missing() {
        assert!(is_supported("report.pdf", None));
        assert!(is_supported("Holiday.JPEG", Some("")));
        assert!(is_supported("a.b.webp", Some("application/octet-stream")));
    }

    #[test]
    fn rejects_other_files() {
        assert!(!is_supported("photo.gif", Some("image/gif")));
        assert!(!is_supported("photo.gif", None));
        assert!(!is_supported("pdf", None));
        assert!(!is_supported("archive.pdf.zip", Some("application/zip")));
    }

    #[test]
    fn ensure_supported_names_the_file() {
        let file = SelectedFile::new("photo.gif", 10, Some("image/gif".into()), "photo.gif");
        match ensure_supported(&file) {
            Err(SquishError::UnsupportedFileType { name }) => assert_eq!(name, "photo.gif"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
