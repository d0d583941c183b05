//! Plain HTTP(S) download transport.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use mediasync_core::{AssetTransport, Error, Result};

/// Streams response bodies straight to disk.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout_seconds: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetTransport for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "Failed to download {}: {}",
                url,
                response.status()
            )));
        }

        let mut file = fs::File::create(dest).await.map_err(|e| {
            warn!(dest = %dest.display(), error = %e, "download: File::create failed");
            e
        })?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Request(format!("Failed to download {}: {}", url, e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(url, dest = %dest.display(), bytes = written, "download: complete");
        Ok(written)
    }
}
