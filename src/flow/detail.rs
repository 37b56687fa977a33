//! Detail flow - resolves a single post for its page

use std::sync::Arc;

use crate::client::{ContentClient, Query};
use crate::content::{DisplayPostDetail, Mapper};
use crate::error::{FetchError, FlowError};

/// What a post page can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    /// The page has not been generated yet; show a neutral placeholder
    Resolving,
    Ready(Box<DisplayPostDetail>),
    NotFound,
    /// The last generation failed; show the unavailable page until a retry
    Failed,
}

/// Fetches and maps individual posts
pub struct DetailFlow<C> {
    client: Arc<C>,
    mapper: Mapper,
    document_type: String,
}

impl<C: ContentClient> DetailFlow<C> {
    /// Create a new detail flow
    pub fn new(client: Arc<C>, mapper: Mapper, document_type: &str) -> Self {
        Self {
            client,
            mapper,
            document_type: document_type.to_string(),
        }
    }

    /// Fetch a post by identifier and map it, with one backend call
    pub async fn resolve(&self, uid: &str) -> Result<DisplayPostDetail, FlowError> {
        let raw = self
            .client
            .get_by_uid(&self.document_type, uid)
            .await?
            .ok_or_else(|| FlowError::NotFound(uid.to_string()))?;

        Ok(self.mapper.present_detail(&raw)?)
    }

    /// Like [`resolve`](Self::resolve), with an unknown identifier as a state
    /// rather than an error
    pub async fn state(&self, uid: &str) -> Result<DetailState, FlowError> {
        match self.resolve(uid).await {
            Ok(detail) => Ok(DetailState::Ready(Box::new(detail))),
            Err(FlowError::NotFound(_)) => Ok(DetailState::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Identifiers of the newest posts, for prerendering
    pub async fn known_paths(&self, limit: usize) -> Result<Vec<String>, FetchError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = Query {
            document_type: self.document_type.clone(),
            fetch: vec![format!("{}.uid", self.document_type)],
            page_size: limit,
        };
        let page = self.client.query(&query).await?;

        Ok(page
            .results
            .iter()
            .filter_map(|r| r.uid.clone())
            .filter(|uid| !uid.is_empty())
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticClient;
    use crate::content::RawRecord;
    use crate::error::MapError;
    use crate::helpers::DateFormatter;
    use crate::i18n::Locale;

    fn client() -> StaticClient {
        let records: Vec<RawRecord> = serde_json::from_value(serde_json::json!([
            {
                "id": "1",
                "uid": "como-utilizar-hooks",
                "type": "posts",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "data": {
                    "title": "Como utilizar Hooks",
                    "author": "Joseph Oliveira",
                    "banner": { "url": "https://images.prismic.io/hooks.png" },
                    "content": [
                        { "heading": "Intro", "body": [{ "type": "paragraph", "text": "a" }, { "type": "paragraph", "text": "b" }] },
                        { "heading": "End", "body": [{ "type": "paragraph", "text": "c" }] }
                    ]
                }
            },
            {
                "id": "3",
                "uid": "rascunho",
                "type": "posts",
                "first_publication_date": null,
                "data": {
                    "title": "Rascunho",
                    "author": "Danilo Vieira",
                    "content": [{ "heading": "Ideia", "body": [{ "type": "paragraph", "text": "x" }] }]
                }
            },
            {
                "id": "2",
                "uid": "sem-autor",
                "type": "posts",
                "first_publication_date": "2021-03-20T19:25:28+0000",
                "data": { "title": "Sem autor" }
            }
        ]))
        .unwrap();
        StaticClient::new(records)
    }

    fn flow() -> DetailFlow<StaticClient> {
        let mapper = Mapper::new(
            DateFormatter::new(Locale::PtBr.strings().unwrap(), None),
            200,
            "--",
        );
        DetailFlow::new(Arc::new(client()), mapper, "posts")
    }

    #[tokio::test]
    async fn test_resolve_known_post() {
        let detail = flow().resolve("como-utilizar-hooks").await.unwrap();
        assert_eq!(detail.title, "Como utilizar Hooks");
        assert_eq!(detail.author, "Joseph Oliveira");
        assert_eq!(
            detail.banner_url.as_deref(),
            Some("https://images.prismic.io/hooks.png")
        );
        assert_eq!(detail.date, "15 Mar 2021");
        assert_eq!(detail.sections.len(), 2);
        assert_eq!(detail.sections[0].paragraphs, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let flow = flow();
        assert!(matches!(
            flow.resolve("nao-existe").await,
            Err(FlowError::NotFound(uid)) if uid == "nao-existe"
        ));
        assert_eq!(flow.state("nao-existe").await.unwrap(), DetailState::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_post_is_an_error() {
        assert!(matches!(
            flow().state("sem-autor").await,
            Err(FlowError::Map(MapError::MissingField { field: "author", .. }))
        ));
    }

    #[tokio::test]
    async fn test_post_without_date_is_ready() {
        match flow().state("rascunho").await.unwrap() {
            DetailState::Ready(detail) => {
                assert_eq!(detail.title, "Rascunho");
                assert_eq!(detail.date, "--");
                assert_eq!(detail.sections[0].heading, "Ideia");
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_state_ready() {
        match flow().state("como-utilizar-hooks").await.unwrap() {
            DetailState::Ready(detail) => assert_eq!(detail.id, "como-utilizar-hooks"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_known_paths() {
        let flow = flow();
        assert_eq!(
            flow.known_paths(1).await.unwrap(),
            vec!["como-utilizar-hooks"]
        );
        assert_eq!(flow.known_paths(5).await.unwrap().len(), 3);
        assert!(flow.known_paths(0).await.unwrap().is_empty());
    }
}
