//! # mediasync-cms
//!
//! Content store access for mediasync: a read-only Directus REST client that
//! fetches the content graph and file metadata, and the HTTP transport used to
//! download asset bytes.
//!
//! ## Example
//!
//! ```ignore
//! use mediasync_cms::{DirectusClient, DirectusConfig};
//! use mediasync_core::ContentSource;
//!
//! let client = DirectusClient::new(DirectusConfig::new("https://cms.example.com", token))?;
//! let graph = client.fetch_graph().await?;
//! ```

pub mod client;
pub mod download;
pub mod fields;

pub use client::{DirectusClient, DirectusConfig};
pub use download::HttpDownloader;
