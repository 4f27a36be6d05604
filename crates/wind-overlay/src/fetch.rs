//! Payload sources and the fetch -> decompress -> decode pipeline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use metrics::counter;
use reqwest::Client;
use tracing::{debug, info, instrument};
use wind_grid::{decode, decompress, DecodedGrid};

use crate::error::{OverlayError, OverlayResult};

/// Something that can deliver a compressed wind payload by URL.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Fetch the raw (still compressed) payload bytes.
    async fn fetch(&self, url: &str) -> OverlayResult<Bytes>;
}

/// Plain HTTP GET, no auth and no retry.
#[derive(Debug, Clone)]
pub struct HttpPayloadSource {
    client: Client,
}

impl HttpPayloadSource {
    pub fn new() -> OverlayResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> OverlayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OverlayError::FetchError(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PayloadSource for HttpPayloadSource {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> OverlayResult<Bytes> {
        debug!(url = %url, "Requesting wind payload");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(OverlayError::FetchError(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        info!(size = bytes.len(), url = %url, "Downloaded wind payload");
        Ok(bytes)
    }
}

/// Reads payloads from a local directory.
///
/// The URL's last path segment is used as the file name, so a remote
/// template can be pointed at a mirror on disk.
#[derive(Debug, Clone)]
pub struct FilePayloadSource {
    root: PathBuf,
}

impl FilePayloadSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let name = path.rsplit('/').next().unwrap_or(path);
        self.root.join(name)
    }
}

#[async_trait]
impl PayloadSource for FilePayloadSource {
    async fn fetch(&self, url: &str) -> OverlayResult<Bytes> {
        let path = self.resolve(url);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| OverlayError::FetchError(format!("{}: {}", path.display(), e)))?;
        debug!(size = data.len(), path = %path.display(), "Read wind payload from disk");
        Ok(Bytes::from(data))
    }
}

/// In-memory payloads keyed by URL. Unknown URLs fail like a 404.
#[derive(Debug, Clone, Default)]
pub struct StaticPayloadSource {
    payloads: HashMap<String, Bytes>,
}

impl StaticPayloadSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(mut self, url: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        self.insert(url, payload);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, payload: impl Into<Bytes>) {
        self.payloads.insert(url.into(), payload.into());
    }
}

#[async_trait]
impl PayloadSource for StaticPayloadSource {
    async fn fetch(&self, url: &str) -> OverlayResult<Bytes> {
        self.payloads
            .get(url)
            .cloned()
            .ok_or_else(|| OverlayError::FetchError(format!("GET {} returned 404 Not Found", url)))
    }
}

/// Fetch, inflate and decode one payload.
///
/// Each stage reports its own error kind.
pub async fn load_grid<P: PayloadSource + ?Sized>(
    source: &P,
    url: &str,
) -> OverlayResult<DecodedGrid> {
    let compressed = source.fetch(url).await?;
    counter!("wind_payload_bytes_total").increment(compressed.len() as u64);

    let body = decompress(&compressed).map_err(|e| OverlayError::DecompressError(e.to_string()))?;
    let grid = decode(&body).map_err(|e| OverlayError::DecodeError(e.to_string()))?;

    let header = grid.header();
    info!(
        nx = header.nx,
        ny = header.ny,
        dx = header.dx,
        dy = header.dy,
        lo1 = header.lo1,
        la1 = header.la1,
        "Decoded wind grid"
    );
    Ok(grid)
}
