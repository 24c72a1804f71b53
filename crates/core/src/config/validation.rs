//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::{AppConfig, FALLBACK_NAME, ProviderConfig};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_endpoint(field: &str, endpoint: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(endpoint).map_err(|e| invalid(field, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        "http" | "https" => Err(invalid(field, "must include a host")),
        scheme => Err(invalid(field, format!("unsupported scheme: {scheme}"))),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_content_length`, `max_bytes`, or a pool size is 0
    /// - a timeout is below 100ms or exceeds 5 minutes
    /// - `max_retries` is 0
    /// - a provider has a duplicate or empty name, a non-http(s) endpoint,
    ///   or a negative / non-finite interval
    /// - the fallback endpoint is not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_content_length == 0 {
            return Err(invalid("max_content_length", "must be greater than 0"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        for (field, value) in [
            ("provider_timeout_ms", self.provider_timeout_ms),
            ("fetch_timeout_ms", self.fetch_timeout_ms),
            ("render_timeout_ms", self.render_timeout_ms),
        ] {
            if value < 100 {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > 300_000 {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.max_retries == 0 {
            return Err(invalid("max_retries", "must allow at least one attempt"));
        }

        if self.render_pool_size == 0 {
            return Err(invalid("render_pool_size", "must be greater than 0"));
        }

        if self.enrich_concurrency == 0 {
            return Err(invalid("enrich_concurrency", "must be greater than 0"));
        }

        check_endpoint("fallback.endpoint", &self.fallback.endpoint)?;

        let providers = self.resolved_providers();
        let mut names = HashSet::new();
        for provider in &providers {
            validate_provider(provider)?;
            if !names.insert(provider.name.as_str()) {
                return Err(invalid("providers", format!("duplicate provider name: {}", provider.name)));
            }
        }

        for name in self.unknown_priority_names() {
            tracing::warn!(provider = %name, "priority names an unconfigured provider; it will be skipped");
        }

        if self.cache_capacity == 0 {
            tracing::warn!("cache_capacity is 0; search results will never be cached");
        }

        Ok(())
    }

    /// Priority entries that name neither a configured provider nor the fallback.
    pub fn unknown_priority_names(&self) -> Vec<&str> {
        let providers = self.resolved_providers();
        self.priority
            .iter()
            .map(String::as_str)
            .filter(|name| *name != FALLBACK_NAME && !providers.iter().any(|p| p.name == *name))
            .collect()
    }
}

fn validate_provider(provider: &ProviderConfig) -> Result<(), ConfigError> {
    if provider.name.trim().is_empty() {
        return Err(invalid("providers.name", "must not be empty"));
    }

    let field = format!("providers.{}", provider.name);

    check_endpoint(&format!("{field}.endpoint"), &provider.endpoint)?;

    if !provider.min_interval_secs.is_finite() || provider.min_interval_secs < 0.0 {
        return Err(invalid(format!("{field}.min_interval_secs"), "must be a finite, non-negative number"));
    }

    if provider.results_field.trim().is_empty() {
        return Err(invalid(format!("{field}.results_field"), "must not be empty"));
    }

    if provider.max_per_request == Some(0) {
        return Err(invalid(format!("{field}.max_per_request"), "must be greater than 0"));
    }

    Ok(())
}
