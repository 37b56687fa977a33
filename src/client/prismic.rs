//! Prismic REST API v2 client

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ContentClient, Query};
use crate::content::{RawPage, RawRecord};
use crate::error::FetchError;

/// Repository metadata returned by the API entry point
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// HTTP client for a Prismic repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for an API entry point such as `https://repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    /// Look up the ref of the currently published content
    async fn master_ref(&self) -> Result<String, FetchError> {
        let info: ApiInfo = self.send(self.with_token(self.http.get(&self.endpoint))).await?;

        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| FetchError::NoMasterRef(self.endpoint.clone()))
    }

    /// Search documents with a list of predicates
    async fn search(
        &self,
        predicates: &[String],
        fetch: &[String],
        page_size: usize,
    ) -> Result<RawPage, FetchError> {
        let master_ref = self.master_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);

        let mut params = vec![
            ("ref", master_ref),
            ("q", format!("[{}]", predicates.join(""))),
            ("pageSize", page_size.to_string()),
        ];
        if !fetch.is_empty() {
            params.push(("fetch", fetch.join(",")));
        }

        tracing::debug!("Searching {} with {:?}", url, predicates);
        self.send(self.with_token(self.http.get(&url).query(&params)))
            .await
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ContentClient for PrismicClient {
    async fn query(&self, query: &Query) -> Result<RawPage, FetchError> {
        let predicates = [at("document.type", &query.document_type)];
        self.search(&predicates, &query.fetch, query.page_size)
            .await
    }

    async fn fetch_page(&self, locator: &str) -> Result<RawPage, FetchError> {
        tracing::debug!("Following next page {}", locator);
        let request = self.http.get(locator);
        let request = if locator.contains("access_token=") {
            request
        } else {
            self.with_token(request)
        };
        self.send(request).await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<RawRecord>, FetchError> {
        let predicates = [at(&format!("my.{}.uid", document_type), uid)];
        let page = self.search(&predicates, &[], 1).await?;
        Ok(page.results.into_iter().next())
    }
}

/// Build an `at` predicate, e.g. `[at(document.type, "posts")]`
fn at(path: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[at({}, \"{}\")]", path, escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_predicate() {
        assert_eq!(at("document.type", "posts"), r#"[at(document.type, "posts")]"#);
        assert_eq!(
            at("my.posts.uid", r#"say "hi""#),
            r#"[at(my.posts.uid, "say \"hi\"")]"#
        );
    }

    #[test]
    fn test_new_trims_endpoint() {
        let client = PrismicClient::new("https://repo.cdn.prismic.io/api/v2/", Some(String::new()))
            .unwrap();
        assert_eq!(client.endpoint, "https://repo.cdn.prismic.io/api/v2");
        assert!(client.access_token.is_none());
    }

    #[test]
    fn test_parse_api_info() {
        let json = r#"{
            "refs": [
                { "id": "preview", "ref": "YF-preview", "label": "Preview", "isMasterRef": false },
                { "id": "master", "ref": "YF-master", "label": "Master", "isMasterRef": true }
            ],
            "types": { "posts": "Posts" }
        }"#;
        let info: ApiInfo = serde_json::from_str(json).unwrap();
        let master = info.refs.into_iter().find(|r| r.is_master_ref).unwrap();
        assert_eq!(master.reference, "YF-master");
    }
}
