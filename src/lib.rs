//! spacetraveling: a server-rendered blog front-end for a Prismic repository
//!
//! Posts are fetched from the content backend, mapped into display models
//! and rendered with built-in Tera templates. The listing page paginates
//! with "load more"; each post has its own page.

pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod flow;
pub mod helpers;
pub mod i18n;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use client::{Backend, ContentClient, PrismicClient, Query, StaticClient};
use content::Mapper;
use flow::{DetailFlow, ListingFlow};
use helpers::DateFormatter;

/// Default configuration file, relative to the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Static assets directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog from a directory, reading `_config.yml` (or `config_path`) when present
    pub fn new<P: AsRef<Path>>(base_dir: P, config_path: Option<&Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base_dir.join(CONFIG_FILE));

        let mut config = if config_path.exists() {
            tracing::debug!("Loading configuration from {:?}", config_path);
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// Build the view-model mapper for the configured locale
    pub fn mapper(&self) -> Result<Mapper> {
        let strings = self.config.locale()?.strings()?;
        let dates = DateFormatter::new(strings, self.config.time_zone()?);
        Ok(Mapper::new(
            dates,
            self.config.words_per_minute,
            &self.config.date_placeholder,
        ))
    }

    /// Content client: the fixtures file when given, otherwise the configured repository
    pub fn client(&self, fixtures: Option<&Path>) -> Result<Backend> {
        if let Some(path) = fixtures {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base_dir.join(path)
            };
            return Ok(Backend::Fixtures(StaticClient::from_file(path)?));
        }

        let content = &self.config.content;
        if content.api_endpoint.trim().is_empty() {
            anyhow::bail!(
                "No content repository configured. Set content.api_endpoint in {} or {}",
                CONFIG_FILE,
                config::ENV_API_ENDPOINT
            );
        }

        Ok(Backend::Prismic(PrismicClient::new(
            &content.api_endpoint,
            content.access_token.clone(),
        )?))
    }

    /// Listing flow over a client
    pub fn listing_flow<C: ContentClient>(&self, client: Arc<C>) -> Result<ListingFlow<C>> {
        Ok(ListingFlow::new(
            client,
            self.mapper()?,
            Query::listing(&self.config.content),
        ))
    }

    /// Detail flow over a client
    pub fn detail_flow<C: ContentClient>(&self, client: Arc<C>) -> Result<DetailFlow<C>> {
        Ok(DetailFlow::new(
            client,
            self.mapper()?,
            &self.config.content.document_type,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path(), None).unwrap();
        assert_eq!(blog.config.content.page_size, 4);
        assert_eq!(blog.public_dir, dir.path().join("public"));
        assert!(blog.mapper().is_ok());
    }

    #[test]
    fn test_new_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "title: Outro blog\npublic_dir: static\nlanguage: en\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path(), None).unwrap();
        assert_eq!(blog.config.title, "Outro blog");
        assert_eq!(blog.public_dir, dir.path().join("static"));
    }

    #[test]
    fn test_client_from_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("posts.json"), "[]").unwrap();

        let blog = Blog::new(dir.path(), None).unwrap();
        let client = blog.client(Some(Path::new("posts.json"))).unwrap();
        assert!(matches!(client, Backend::Fixtures(_)));
    }
}
