//! # mediasync-core
//!
//! Core types, traits, and the content graph scanner for mediasync.
//!
//! This crate provides the asset data model, the ledger entry shape, the
//! typed content graph and its scanner, run configuration, and the traits at
//! the seams to the content store, download transport, and media encoder.

pub mod config;
pub mod content;
pub mod defaults;
pub mod error;
pub mod format;
pub mod models;
pub mod scanner;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{MirrorConfig, UnknownBlockPolicy};
pub use content::{Block, ContentGraph, Relation};
pub use error::{Error, Result};
pub use format::{format_bytes, percent_of, percent_saved};
pub use models::*;
pub use scanner::{AssetPathPattern, ContentScanner, ReferenceExtractor, ScanReport};
pub use traits::*;
