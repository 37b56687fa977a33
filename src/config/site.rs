//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::i18n::Locale;

/// Environment variable overriding `content.api_endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `content.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    /// IANA zone used to pick the calendar day of a timestamp; empty keeps the backend offset
    pub timezone: String,
    pub root: String,
    pub logo: String,
    pub public_dir: String,
    /// Shown instead of a publication date that cannot be parsed
    pub date_placeholder: String,
    pub words_per_minute: u32,

    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub revalidate: RevalidateConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: String::new(),
            root: "/".to_string(),
            logo: "/images/Logo.svg".to_string(),
            public_dir: "public".to_string(),
            date_placeholder: "--".to_string(),
            words_per_minute: 200,

            content: ContentConfig::default(),
            revalidate: RevalidateConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_ENDPOINT).ok(),
            std::env::var(ENV_ACCESS_TOKEN).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using API endpoint from {}", ENV_API_ENDPOINT);
            self.content.api_endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.content.access_token = Some(token);
        }
    }

    /// Display locale
    pub fn locale(&self) -> Result<Locale> {
        self.language.parse()
    }

    /// Optional time zone for date display
    pub fn time_zone(&self) -> Result<Option<chrono_tz::Tz>> {
        if self.timezone.trim().is_empty() {
            return Ok(None);
        }
        self.timezone
            .trim()
            .parse::<chrono_tz::Tz>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {}", self.timezone, e))
    }
}

/// Content repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Prismic API entry point, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub api_endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: usize,
    /// Fields requested for listing summaries
    #[serde(default)]
    pub fetch: Vec<String>,
    /// Detail pages rendered at server start
    pub prerender_paths: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 4,
            fetch: vec![
                "posts.title".to_string(),
                "posts.subtitle".to_string(),
                "posts.author".to_string(),
            ],
            prerender_paths: 1,
        }
    }
}

/// How long rendered data stays fresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidateConfig {
    pub listing_secs: u64,
    pub detail_secs: u64,
    /// Unknown or failed post pages are retried after this long
    pub missing_secs: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            listing_secs: 60 * 60 * 24,
            detail_secs: 60 * 30,
            missing_secs: 60,
        }
    }
}

impl RevalidateConfig {
    pub fn listing(&self) -> Duration {
        Duration::from_secs(self.listing_secs)
    }

    pub fn detail(&self) -> Duration {
        Duration::from_secs(self.detail_secs)
    }

    pub fn missing(&self) -> Duration {
        Duration::from_secs(self.missing_secs)
    }
}

/// What a detail request sees before its page has been generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Render a loading page and generate in the background
    #[default]
    Placeholder,
    /// Generate before answering
    Blocking,
}

/// Page server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub fallback: Fallback,
    /// Listing page views idle for longer than this are discarded
    pub session_idle_secs: u64,
    /// Most post pages kept in memory; the oldest are evicted first
    pub page_cache_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            fallback: Fallback::Placeholder,
            session_idle_secs: 60 * 30,
            page_cache_size: 1000,
        }
    }
}
