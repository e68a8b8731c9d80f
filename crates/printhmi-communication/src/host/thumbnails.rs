//! G-code file thumbnails
//!
//! Thumbnails are listed by `server.files.thumbnails` and downloaded from the
//! host's file endpoint relative to the gcodes root.

use async_trait::async_trait;
use printhmi_core::{HostError, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// One thumbnail embedded in a G-code file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThumbnailInfo {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    #[serde(default)]
    pub height: u32,
    /// Size of the encoded image in bytes
    #[serde(default)]
    pub size: Option<u64>,
    /// Path relative to the gcodes root
    pub thumbnail_path: String,
}

/// Choose the thumbnail to show for a target width
///
/// Exact width match first, otherwise the first candidate.
pub fn select_thumbnail(candidates: &[ThumbnailInfo], width: u32) -> Option<&ThumbnailInfo> {
    candidates
        .iter()
        .find(|candidate| candidate.width == width)
        .or_else(|| candidates.first())
}

/// Download URL of a thumbnail
pub fn thumbnail_url(base: &Url, thumbnail_path: &str) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| HostError::ThumbnailFetch {
            reason: format!("{base} cannot be a base URL"),
        })?;
        segments.pop_if_empty().extend(["server", "files", "gcodes"]);
        segments.extend(thumbnail_path.split('/').filter(|part| !part.is_empty()));
    }
    Ok(url)
}

/// Source of encoded thumbnail bytes
#[async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    /// Fetch the encoded image stored at `thumbnail_path`
    async fn fetch(&self, thumbnail_path: &str) -> Result<Vec<u8>>;
}

/// Downloads thumbnails over HTTP
pub struct HttpThumbnailFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpThumbnailFetcher {
    /// Create a fetcher against `base` with a per-request timeout
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HostError::ThumbnailFetch {
                reason: e.to_string(),
            })?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl ThumbnailFetcher for HttpThumbnailFetcher {
    async fn fetch(&self, thumbnail_path: &str) -> Result<Vec<u8>> {
        let url = thumbnail_url(&self.base, thumbnail_path)?;
        tracing::debug!("Fetching thumbnail {}", url);
        let fetch_error = |e: reqwest::Error| HostError::ThumbnailFetch {
            reason: e.to_string(),
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?;
        let bytes = response.bytes().await.map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: u32, path: &str) -> ThumbnailInfo {
        ThumbnailInfo {
            width,
            height: width,
            size: None,
            thumbnail_path: path.to_string(),
        }
    }

    #[test]
    fn test_select_exact_width() {
        let candidates = vec![info(32, ".thumbs/a-32x32.png"), info(160, ".thumbs/a-160x160.png")];
        assert_eq!(
            select_thumbnail(&candidates, 160).unwrap().thumbnail_path,
            ".thumbs/a-160x160.png"
        );
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let candidates = vec![info(48, ".thumbs/a-48x48.png"), info(300, ".thumbs/a-300x300.png")];
        assert_eq!(select_thumbnail(&candidates, 160).unwrap().width, 48);
        assert!(select_thumbnail(&[], 160).is_none());
    }

    #[test]
    fn test_thumbnail_url_encodes_segments() {
        let base = Url::parse("http://printer.local:7125").unwrap();
        let url = thumbnail_url(&base, "parts/.thumbs/my part-160x160.png").unwrap();
        assert_eq!(
            url.as_str(),
            "http://printer.local:7125/server/files/gcodes/parts/.thumbs/my%20part-160x160.png"
        );
    }

    #[test]
    fn test_thumbnail_info_deserializes_host_payload() {
        let payload = serde_json::json!([
            {"width": 32, "height": 32, "size": 1024, "thumbnail_path": ".thumbs/cube-32x32.png"}
        ]);
        let list: Vec<ThumbnailInfo> = serde_json::from_value(payload).unwrap();
        assert_eq!(list[0].size, Some(1024));
    }
}
