//! Endpoint methods for the compression service.

use bytes::Bytes;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use squish_core::{download_filename, SelectedFile, StatsSnapshot};

use crate::{ApiClient, ApiError};

/// Whether a stats request counts as a page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsMode {
    /// `POST /api/stats`, increments the view counter.
    CountView,
    /// `GET /api/stats`, read only.
    ReadOnly,
}

/// Body of a successful compression together with the filename hint.
#[derive(Debug, Clone)]
pub struct CompressedFile {
    pub bytes: Bytes,
    pub content_disposition: Option<String>,
}

impl CompressedFile {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Name to save the result under, see [`download_filename`].
    pub fn filename_for(&self, original_name: &str) -> String {
        download_filename(self.content_disposition.as_deref(), original_name)
    }
}

/// Health probe response (`GET /`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Millisecond timestamp appended as `t` so intermediaries never serve a cached count.
fn cache_buster() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

impl ApiClient {
    /// Upload `file` and ask for a result of `target_kb` kilobytes.
    ///
    /// The multipart body carries the raw bytes under `file` and the target
    /// under `targetSizeKB`.
    #[tracing::instrument(
        skip(self, file),
        fields(file = %file.name, size = file.size, operation = "compress")
    )]
    pub async fn compress(
        &self,
        file: &SelectedFile,
        target_kb: f64,
    ) -> Result<CompressedFile, ApiError> {
        let data = tokio::fs::read(&file.path)
            .await
            .map_err(|source| ApiError::ReadFile {
                path: file.path.display().to_string(),
                source,
            })?;

        let part = Part::bytes(data)
            .file_name(file.name.clone())
            .mime_str(file.media_type_or_default())
            .map_err(|e| ApiError::InvalidRequest(format!("invalid media type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("targetSizeKB", target_kb.to_string());

        tracing::debug!(target_kb, "Submitting compression request");

        let response = self
            .client
            .post(self.build_url("/api/compress"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;

        tracing::info!(
            compressed_bytes = bytes.len(),
            "Compression request completed"
        );

        Ok(CompressedFile {
            bytes,
            content_disposition,
        })
    }

    /// Fetch the usage counters, counting a view when `mode` asks for it.
    pub async fn stats(&self, mode: StatsMode) -> Result<StatsSnapshot, ApiError> {
        let url = self.build_url("/api/stats");
        let request = match mode {
            StatsMode::CountView => self.client.post(&url),
            StatsMode::ReadOnly => self.client.get(&url),
        };

        let response = request.query(&[("t", cache_buster())]).send().await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Probe the service root.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.client.get(self.build_url("/")).send().await?;

        if !response.status().is_success() {
            return Err(Self::server_error(response).await);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, len: usize) -> SelectedFile {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![b'x'; len]).unwrap();
        SelectedFile::from_path(&path).unwrap()
    }

    #[tokio::test]
    async fn compress_sends_multipart_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/compress")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="doc.pdf""#.to_string()),
                Matcher::Regex(r#"name="targetSizeKB"\r\n\r\n1024\r\n"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-disposition", r#"attachment; filename="out.pdf""#)
            .with_body(vec![7u8; 300])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "doc.pdf", 2048);

        let result = client_for(&server).compress(&file, 1024.0).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.len(), 300);
        assert_eq!(result.filename_for(&file.name), "out.pdf");
    }

    #[tokio::test]
    async fn compress_without_disposition_prefixes_original_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/compress")
            .with_status(200)
            .with_body("data")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "doc.pdf", 64);

        let result = client_for(&server).compress(&file, 0.5).await.unwrap();
        assert!(result.content_disposition.is_none());
        assert_eq!(result.filename_for("doc.pdf"), "compressed_doc.pdf");
    }

    #[tokio::test]
    async fn compress_surfaces_server_error_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/compress")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"too large"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "doc.pdf", 64);

        let err = client_for(&server).compress(&file, 0.5).await.unwrap_err();
        match &err {
            ApiError::Server { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message.as_deref(), Some("too large"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn compress_server_error_without_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/compress")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "doc.pdf", 64);

        let err = client_for(&server).compress(&file, 0.5).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Server {
                status: 502,
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn compress_missing_file_is_read_error() {
        let server = mockito::Server::new_async().await;
        let file = SelectedFile::new("gone.pdf", 10, None, "/nonexistent/gone.pdf");

        let err = client_for(&server).compress(&file, 1.0).await.unwrap_err();
        assert!(matches!(err, ApiError::ReadFile { .. }));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_file(&dir, "doc.pdf", 64);
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let err = client.compress(&file, 0.5).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn stats_count_view_posts_with_cache_buster() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/stats")
            .match_query(Matcher::Regex(r"^t=\d+$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"views": 1001, "pdfs": 5, "images": 9}"#)
            .create_async()
            .await;

        let snapshot = client_for(&server)
            .stats(StatsMode::CountView)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            snapshot,
            StatsSnapshot {
                views: 1001,
                pdfs: 5,
                images: 9
            }
        );
    }

    #[tokio::test]
    async fn stats_read_only_uses_get() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/stats")
            .match_query(Matcher::Regex(r"^t=\d+$".to_string()))
            .with_status(200)
            .with_body(r#"{"views": 1, "pdfs": 2, "images": 3}"#)
            .create_async()
            .await;

        let snapshot = client_for(&server).stats(StatsMode::ReadOnly).await.unwrap();

        mock.assert_async().await;
        assert_eq!(snapshot.images, 3);
    }

    #[tokio::test]
    async fn stats_with_bad_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/stats")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server)
            .stats(StatsMode::ReadOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn health_reads_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"status": "API is running"}"#)
            .create_async()
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert_eq!(health.status, "API is running");
    }
}
