//! Raw document shapes returned by the content backend

use serde::{Deserialize, Serialize};

/// A post document as the backend sends it
///
/// Everything under `data` is optional on the wire; the mapper decides
/// which fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,

    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type name, e.g. `posts`
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub last_publication_date: Option<String>,

    #[serde(default)]
    pub data: RawFields,
}

impl RawRecord {
    /// Identifier used in URLs: the uid, or the document id when there is none
    pub fn identifier(&self) -> &str {
        self.uid
            .as_deref()
            .filter(|uid| !uid.is_empty())
            .unwrap_or(&self.id)
    }
}

/// The `data` bag of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFields {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub banner: Option<RawImage>,

    #[serde(default)]
    pub content: Vec<RawBlock>,
}

/// Image field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub alt: Option<String>,
}

/// One content group: a heading followed by rich-text paragraphs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub heading: Option<String>,

    #[serde(default)]
    pub body: Vec<RawSpan>,
}

/// A rich-text element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub text: String,

    /// Inline formatting ranges, kept opaque
    #[serde(default)]
    pub spans: Vec<serde_json::Value>,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub results_per_page: u32,

    #[serde(default)]
    pub total_results_size: u32,

    #[serde(default)]
    pub total_pages: u32,

    /// Continuation URL, absent on the last page
    #[serde(default)]
    pub next_page: Option<String>,

    #[serde(default)]
    pub results: Vec<RawRecord>,
}
