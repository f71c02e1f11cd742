//! Persistent CLI settings.

pub mod storage;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use storyfeed_core::BaseUrl;
use storyfeed_engine::FeedConfig;

/// Environment variable overriding the stored source.
pub const SOURCE_ENV: &str = "STORYFEED_SOURCE";

/// Backend used when nothing else is configured.
pub const DEFAULT_SOURCE: &str = "http://127.0.0.1:8001";

/// Stored settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default story source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<BaseUrl>,

    /// Engine tuning.
    #[serde(default)]
    pub feed: FeedConfig,
}

impl Settings {
    /// Pick the source for this invocation: flag, then environment, then
    /// stored setting, then the default.
    pub fn resolve_source(&self, flag: Option<&str>) -> Result<BaseUrl> {
        if let Some(flag) = flag {
            return BaseUrl::new(flag).context("Invalid --source URL");
        }

        if let Some(env) = std::env::var(SOURCE_ENV).ok().filter(|v| !v.trim().is_empty()) {
            return BaseUrl::new(env.trim())
                .with_context(|| format!("Invalid {SOURCE_ENV} URL"));
        }

        match &self.source {
            Some(source) => Ok(source.clone()),
            None => BaseUrl::new(DEFAULT_SOURCE).context("Invalid default source"),
        }
    }
}
