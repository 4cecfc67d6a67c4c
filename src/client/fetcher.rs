// Content fetcher: signed URL plus bounded text download

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{ApiClient, ClientError, ClientResult};
use crate::preview::is_text_file;
use crate::storage::DELIMITER;

/// What the preview pane can show besides the download link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PreviewContent {
    /// Decoded body of a textual file.
    Text(String),
    /// The body exceeds the preview limit; offer a download instead.
    TooLarge { limit: u64 },
    /// The body could not be downloaded.
    Unavailable,
    /// Not a textual format; only the signed URL is useful.
    NotText,
}

impl PreviewContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            PreviewContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedPreview {
    pub url: String,
    pub content: PreviewContent,
}

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

/// File name used when saving `key` without an explicit path: its last
/// non-empty segment.
pub fn default_file_name(key: &str) -> String {
    key.rsplit(DELIMITER)
        .find(|segment| !segment.is_empty())
        .unwrap_or("download")
        .to_string()
}

#[derive(Clone)]
pub struct ContentFetcher {
    api: ApiClient,
    max_bytes: u64,
}

impl ContentFetcher {
    pub fn new(api: ApiClient, max_bytes: u64) -> Self {
        Self { api, max_bytes }
    }

    /// Sign a download URL for `key` and, for textual formats, download the body.
    ///
    /// Signing failures propagate; download failures only degrade the content
    /// to [`PreviewContent::Unavailable`]. Nothing is cached.
    pub async fn preview(&self, container: &str, key: &str) -> ClientResult<FetchedPreview> {
        if container.is_empty() || key.is_empty() {
            return Err(ClientError::Request("Bucket and key are required.".to_string()));
        }

        let url = self.api.presign(container, key).await?;
        let content = if is_text_file(key) {
            self.download_text(&url).await
        } else {
            PreviewContent::NotText
        };

        Ok(FetchedPreview { url, content })
    }

    /// Sign a download URL for `key` and stream the object into `dest`.
    ///
    /// Unlike previews there is no size limit, and failures are errors.
    pub async fn download(&self, container: &str, key: &str, dest: &Path) -> ClientResult<Downloaded> {
        if container.is_empty() || key.is_empty() {
            return Err(ClientError::Request("Bucket and key are required.".to_string()));
        }
        let url = self.api.presign(container, key).await?;
        let bytes = self.save_url(&url, dest).await?;
        info!("Downloaded {}/{} to {} ({} bytes)", container, key, dest.display(), bytes);
        Ok(Downloaded {
            path: dest.to_path_buf(),
            bytes,
        })
    }

    /// Stream an already signed URL into `dest`, returning the bytes written.
    pub async fn save_url(&self, url: &str, dest: &Path) -> ClientResult<u64> {
        let mut response = self.api.http().get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Request(format!(
                "Download failed with status {}",
                status.as_u16()
            )));
        }

        let file_error = |e: std::io::Error| ClientError::Io(format!("{}: {}", dest.display(), e));
        let mut file = File::create(dest).await.map_err(file_error)?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(file_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(file_error)?;
        Ok(written)
    }

    async fn download_text(&self, url: &str) -> PreviewContent {
        let mut response = match self.api.http().get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("Preview download returned {}", response.status());
                return PreviewContent::Unavailable;
            }
            Err(e) => {
                warn!("Preview download failed: {}", e);
                return PreviewContent::Unavailable;
            }
        };

        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            debug!("Preview skipped, content length over {} bytes", self.max_bytes);
            return PreviewContent::TooLarge {
                limit: self.max_bytes,
            };
        }

        // Content-Length may be absent or wrong, so the limit is also
        // enforced while streaming.
        let mut body: Vec<u8> = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if body.len() as u64 + chunk.len() as u64 > self.max_bytes {
                        return PreviewContent::TooLarge {
                            limit: self.max_bytes,
                        };
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Preview download interrupted: {}", e);
                    return PreviewContent::Unavailable;
                }
            }
        }

        PreviewContent::Text(String::from_utf8_lossy(&body).into_owned())
    }
}
