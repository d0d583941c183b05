//! Directus REST client for collection and file metadata reads.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use mediasync_core::{
    AssetId, ContentGraph, ContentSource, Error, FileMetadata, ImageTransform, MirrorConfig,
    Result,
};

use crate::fields;

/// Configuration for the content store client.
#[derive(Debug, Clone)]
pub struct DirectusConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// Static bearer token.
    pub token: String,
    /// Request timeout in seconds; `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

impl DirectusConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            timeout_seconds: None,
        }
    }

    /// Create from environment variables, with the same parsing and validation as [`MirrorConfig`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self::from_mirror_config(&MirrorConfig::from_lookup(lookup)?))
    }

    pub fn from_mirror_config(config: &MirrorConfig) -> Self {
        let mut this = Self::new(config.cms_url.clone(), config.cms_token.clone());
        this.timeout_seconds = config.http_timeout_secs;
        this
    }
}

/// Response envelope used by every Directus read.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Read-only Directus client.
pub struct DirectusClient {
    client: Client,
    config: DirectusConfig,
}

impl DirectusClient {
    pub fn new(config: DirectusConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(url = %config.base_url, "Initializing content store client");

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(DirectusConfig::from_env()?)
    }

    pub fn config(&self) -> &DirectusConfig {
        &self.config
    }

    fn get(&self, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, endpoint);
        self.client.get(url).bearer_auth(&self.config.token)
    }

    /// Read every row of a collection with the given field selection.
    pub async fn read_items(&self, collection: &str, fields: &str) -> Result<Vec<JsonValue>> {
        debug!(collection, "Reading collection");
        let response = self
            .get(&format!("/items/{}", collection))
            .query(&[("fields", fields), ("limit", "-1")])
            .send()
            .await
            .map_err(|e| Error::Request(format!("read {} failed: {}", collection, e)))?;

        let rows: Vec<JsonValue> = decode(response, collection).await?;
        debug!(collection, rows = rows.len(), "Collection read");
        Ok(rows)
    }
}

async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized(format!(
            "{} returned {}: {}",
            context, status, body
        ))),
        _ => Err(Error::Request(format!(
            "{} returned {}: {}",
            context, status, body
        ))),
    }
}

async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let response = check_status(response, context).await?;
    let envelope: Envelope<T> = response.json().await.map_err(|e| {
        Error::Serialization(format!("Failed to parse {} response: {}", context, e))
    })?;
    Ok(envelope.data)
}

#[async_trait]
impl ContentSource for DirectusClient {
    async fn fetch_graph(&self) -> Result<ContentGraph> {
        let posts = self.read_items(fields::POSTS, &fields::post_fields()).await?;
        let categories = self
            .read_items(fields::CATEGORIES, &fields::category_fields())
            .await?;
        let pages = self.read_items(fields::PAGES, &fields::page_fields()).await?;

        info!(
            posts = posts.len(),
            categories = categories.len(),
            pages = pages.len(),
            "Fetched content"
        );
        Ok(ContentGraph::from_rows(posts, categories, pages))
    }

    async fn fetch_file_metadata(&self, ids: &BTreeSet<AssetId>) -> Result<Vec<FileMetadata>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = json!({ "id": { "_in": ids } });

        let response = self
            .get("/files")
            .query(&[
                ("filter", filter.to_string().as_str()),
                ("fields", fields::FILE_FIELDS),
                ("limit", "-1"),
            ])
            .send()
            .await
            .map_err(|e| Error::Request(format!("file metadata query failed: {}", e)))?;

        let files: Vec<FileMetadata> = decode(response, "files").await?;
        debug!(requested = ids.len(), returned = files.len(), "Fetched file metadata");
        Ok(files)
    }

    fn asset_url(&self, id: &AssetId, transform: Option<&ImageTransform>) -> String {
        let base = format!("{}/assets/{}", self.config.base_url, id);
        match transform {
            Some(t) => format!(
                "{}?width={}&quality={}&format={}",
                base, t.width, t.quality, t.format
            ),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DirectusClient {
        DirectusClient::new(DirectusConfig::new("https://cms.example.com/", "token")).unwrap()
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        assert_eq!(client().config().base_url, "https://cms.example.com");
    }

    #[test]
    fn test_asset_url_plain() {
        let url = client().asset_url(&AssetId::from("9a07"), None);
        assert_eq!(url, "https://cms.example.com/assets/9a07");
    }

    #[test]
    fn test_asset_url_with_transform() {
        let url = client().asset_url(&AssetId::from("9a07"), Some(&ImageTransform::default()));
        assert_eq!(
            url,
            "https://cms.example.com/assets/9a07?width=800&quality=80&format=webp"
        );
    }

    #[test]
    fn test_from_mirror_config_carries_timeout() {
        let mut mirror = MirrorConfig::new("https://cms", "t");
        mirror.http_timeout_secs = Some(30);
        let config = DirectusConfig::from_mirror_config(&mirror);
        assert_eq!(config.timeout_seconds, Some(30));
    }

    fn lookup(timeout: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key| match key {
            "DIRECTUS_URL" => Some("https://cms.example.com/".to_string()),
            "DIRECTUS_TOKEN" => Some("token".to_string()),
            "MEDIASYNC_HTTP_TIMEOUT_SECS" => Some(timeout.to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_from_lookup_shares_mirror_config_parsing() {
        let config = DirectusConfig::from_lookup(lookup("45")).unwrap();
        assert_eq!(config.base_url, "https://cms.example.com");
        assert_eq!(config.timeout_seconds, Some(45));
    }

    #[test]
    fn test_from_lookup_rejects_malformed_timeout() {
        let err = DirectusConfig::from_lookup(lookup("soon")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {:?}", err);
    }
}
