//! Where compressed results end up.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use squish_core::content_disposition::ATTACHMENT_FALLBACK_NAME;
use squish_core::validation::sanitize_filename;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Receives the bytes of a finished compression.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under (a sanitized form of) `filename` and return where
    /// they were written.
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

/// Writes results into a directory, never overwriting existing files.
///
/// A clash gets a numbered name, so a second `out.pdf` becomes `out (1).pdf`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Write `bytes` to a freshly created file at `path`, removing it again if the
/// write does not complete.
async fn write_contents<W>(mut writer: W, path: &Path, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let result = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = result {
        drop(writer);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %remove_err, "Failed to remove partial download");
        }
        return Err(e);
    }
    Ok(())
}

fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", stem, attempt),
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let name = sanitize_filename(filename, ATTACHMENT_FALLBACK_NAME);
        tokio::fs::create_dir_all(&self.dir).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.dir.join(numbered_name(&name, attempt));
            let file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };

            write_contents(file, &path, bytes).await?;

            tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved download");
            return Ok(path);
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free file name for {} in {}", name, self.dir.display()),
        ))
    }
}
