//! Core types and shared functionality for sift.
//!
//! This crate provides:
//! - The canonical `SearchResult` record
//! - Insertion-ordered result cache
//! - Unified error types
//! - Configuration structures and provider presets

pub mod cache;
pub mod config;
pub mod error;
pub mod result;

pub use cache::ResultCache;
pub use config::{AppConfig, ConfigError, FALLBACK_NAME, FallbackConfig, HitFields, ProviderConfig};
pub use error::Error;
pub use result::SearchResult;
