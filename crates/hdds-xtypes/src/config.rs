// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry and TypeLookup configuration.
//!
//! Defaults can be overridden from the environment:
//!
//! - `HDDS_XTYPES_MAX_NODES`: live type node limit, 0 = unlimited (default: 0)
//! - `HDDS_XTYPES_RESOLVE_TIMEOUT_MS`: default resolve wait (default: 5000)
//! - `HDDS_XTYPES_RETRY_INTERVAL_MS`: TypeLookup resend interval (default: 1000)
//! - `HDDS_XTYPES_MAX_REQUEST_BATCH`: identifiers per request (default: 64)
//!
//! With the `config-loaders` feature the same fields can be read from YAML:
//!
//! ```yaml
//! max_nodes: 4096
//! resolve_timeout_ms: 2000
//! request_retry_interval_ms: 500
//! max_request_batch: 32
//! ```

use std::time::Duration;

/// Default wait used by `TypeLookupService::resolve`.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default minimum age before a pending request is re-sent.
pub const DEFAULT_REQUEST_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of identifiers carried by one request.
pub const DEFAULT_MAX_REQUEST_BATCH: usize = 64;

/// Per-domain type registry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Maximum number of live type nodes (0 = unlimited).
    pub max_nodes: usize,

    /// Default deadline for blocking resolution.
    pub resolve_timeout: Duration,

    /// Minimum age before an unanswered request is sent again.
    pub request_retry_interval: Duration,

    /// Maximum identifiers per TypeLookup request.
    pub max_request_batch: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_nodes: 0,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            request_retry_interval: DEFAULT_REQUEST_RETRY_INTERVAL,
            max_request_batch: DEFAULT_MAX_REQUEST_BATCH,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl RegistryConfig {
    /// Defaults overridden by `HDDS_XTYPES_*` environment variables.
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max_nodes) = env_parse::<usize>("HDDS_XTYPES_MAX_NODES") {
            config.max_nodes = max_nodes;
        }
        if let Some(ms) = env_parse::<u64>("HDDS_XTYPES_RESOLVE_TIMEOUT_MS") {
            config.resolve_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("HDDS_XTYPES_RETRY_INTERVAL_MS") {
            config.request_retry_interval = Duration::from_millis(ms);
        }
        if let Some(batch) = env_parse::<usize>("HDDS_XTYPES_MAX_REQUEST_BATCH") {
            if batch > 0 {
                config.max_request_batch = batch;
            }
        }
        config
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn with_request_retry_interval(mut self, interval: Duration) -> Self {
        self.request_retry_interval = interval;
        self
    }

    pub fn with_max_request_batch(mut self, batch: usize) -> Self {
        self.max_request_batch = batch.max(1);
        self
    }
}

#[cfg(feature = "config-loaders")]
mod yaml {
    use super::RegistryConfig;
    use crate::error::{Error, Result};
    use serde::Deserialize;
    use std::path::Path;
    use std::time::Duration;

    /// YAML document layout. Missing fields keep their defaults.
    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct YamlRegistryConfig {
        max_nodes: Option<usize>,
        resolve_timeout_ms: Option<u64>,
        request_retry_interval_ms: Option<u64>,
        max_request_batch: Option<usize>,
    }

    impl RegistryConfig {
        /// Parse a YAML document on top of the defaults.
        pub fn from_yaml_str(yaml_content: &str) -> Result<Self> {
            let doc: YamlRegistryConfig = serde_yaml::from_str(yaml_content)
                .map_err(|e| Error::BadParameter(format!("Failed to parse YAML: {}", e)))?;

            let mut config = RegistryConfig::default();
            if let Some(max_nodes) = doc.max_nodes {
                config.max_nodes = max_nodes;
            }
            if let Some(ms) = doc.resolve_timeout_ms {
                config.resolve_timeout = Duration::from_millis(ms);
            }
            if let Some(ms) = doc.request_retry_interval_ms {
                config.request_retry_interval = Duration::from_millis(ms);
            }
            if let Some(batch) = doc.max_request_batch {
                if batch == 0 {
                    return Err(Error::BadParameter(
                        "max_request_batch must be at least 1".to_string(),
                    ));
                }
                config.max_request_batch = batch;
            }
            Ok(config)
        }

        /// Read and parse a YAML file.
        pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
            let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
                Error::BadParameter(format!(
                    "Failed to read {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
            Self::from_yaml_str(&content)
        }
    }
}
