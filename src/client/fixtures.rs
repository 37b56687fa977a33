//! In-memory content repository backed by a JSON file

use std::fs;
use std::path::Path;

use super::{ContentClient, Query};
use crate::content::{RawPage, RawRecord};
use crate::error::FetchError;

const LOCATOR_PREFIX: &str = "fixtures://";

/// Serves documents from memory with the same paging contract as the API.
///
/// Locators look like `fixtures://posts?page=2&pageSize=4`.
#[derive(Debug, Clone, Default)]
pub struct StaticClient {
    records: Vec<RawRecord>,
}

impl StaticClient {
    /// Create a client over a set of documents, in listing order
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Load documents from a JSON array file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FetchError::Fixtures(format!("{}: {}", path.display(), e)))?;
        let records: Vec<RawRecord> = serde_json::from_str(&content)?;
        tracing::info!("Loaded {} documents from {:?}", records.len(), path);
        Ok(Self::new(records))
    }

    fn page(&self, document_type: &str, page: usize, page_size: usize) -> RawPage {
        let matching: Vec<&RawRecord> = self
            .records
            .iter()
            .filter(|r| r.document_type.as_deref().map_or(true, |t| t == document_type))
            .collect();

        let total = matching.len();
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);

        let next_page = (end < total).then(|| {
            format!(
                "{}{}?page={}&pageSize={}",
                LOCATOR_PREFIX,
                document_type,
                page + 1,
                page_size
            )
        });

        RawPage {
            page: page as u32,
            results_per_page: page_size as u32,
            total_results_size: total as u32,
            total_pages: total.div_ceil(page_size) as u32,
            next_page,
            results: matching[start..end].iter().map(|r| (*r).clone()).collect(),
        }
    }
}

impl ContentClient for StaticClient {
    async fn query(&self, query: &Query) -> Result<RawPage, FetchError> {
        Ok(self.page(&query.document_type, 1, query.page_size.max(1)))
    }

    async fn fetch_page(&self, locator: &str) -> Result<RawPage, FetchError> {
        let (document_type, page, page_size) = parse_locator(locator)
            .ok_or_else(|| FetchError::Fixtures(format!("invalid locator {:?}", locator)))?;
        Ok(self.page(document_type, page, page_size))
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<RawRecord>, FetchError> {
        Ok(self
            .records
            .iter()
            .find(|r| {
                r.uid.as_deref() == Some(uid)
                    && r.document_type.as_deref().map_or(true, |t| t == document_type)
            })
            .cloned())
    }
}

fn parse_locator(locator: &str) -> Option<(&str, usize, usize)> {
    let rest = locator.strip_prefix(LOCATOR_PREFIX)?;
    let (document_type, params) = rest.split_once('?')?;

    let mut page = None;
    let mut page_size = None;
    for pair in params.split('&') {
        match pair.split_once('=')? {
            ("page", v) => page = v.parse::<usize>().ok(),
            ("pageSize", v) => page_size = v.parse::<usize>().ok(),
            _ => {}
        }
    }

    Some((
        document_type,
        page.filter(|p| *p > 0)?,
        page_size.filter(|s| *s > 0)?,
    ))
}
