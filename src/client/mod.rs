//! Content client - the seam between the flows and the content backend

mod fixtures;
mod prismic;

use std::future::Future;

pub use fixtures::StaticClient;
pub use prismic::PrismicClient;

use crate::config::ContentConfig;
use crate::content::{RawPage, RawRecord};
use crate::error::FetchError;

/// A document search against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Custom type to match, e.g. `posts`
    pub document_type: String,
    /// Fields to include, e.g. `posts.title`; empty means all
    pub fetch: Vec<String>,
    pub page_size: usize,
}

impl Query {
    /// Listing query for the configured post type
    pub fn listing(config: &ContentConfig) -> Self {
        Self {
            document_type: config.document_type.clone(),
            fetch: config.fetch.clone(),
            page_size: config.page_size.max(1),
        }
    }
}

/// Access to a headless content repository
pub trait ContentClient: Send + Sync + 'static {
    /// Run a search and return its first page
    fn query(&self, query: &Query) -> impl Future<Output = Result<RawPage, FetchError>> + Send;

    /// Follow a `next_page` locator returned by an earlier page
    fn fetch_page(&self, locator: &str)
        -> impl Future<Output = Result<RawPage, FetchError>> + Send;

    /// Fetch one document by its uid, `None` when there is no such document
    fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> impl Future<Output = Result<Option<RawRecord>, FetchError>> + Send;
}

/// The client chosen at startup
pub enum Backend {
    Prismic(PrismicClient),
    Fixtures(StaticClient),
}

impl ContentClient for Backend {
    async fn query(&self, query: &Query) -> Result<RawPage, FetchError> {
        match self {
            Backend::Prismic(client) => client.query(query).await,
            Backend::Fixtures(client) => client.query(query).await,
        }
    }

    async fn fetch_page(&self, locator: &str) -> Result<RawPage, FetchError> {
        match self {
            Backend::Prismic(client) => client.fetch_page(locator).await,
            Backend::Fixtures(client) => client.fetch_page(locator).await,
        }
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<RawRecord>, FetchError> {
        match self {
            Backend::Prismic(client) => client.get_by_uid(document_type, uid).await,
            Backend::Fixtures(client) => client.get_by_uid(document_type, uid).await,
        }
    }
}
