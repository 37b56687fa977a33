//! Error types for content mapping and fetching

use thiserror::Error;

/// A publication timestamp that is missing or cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable publication date: {}", .value.as_deref().unwrap_or("<null>"))]
pub struct FormatError {
    /// The raw value, `None` when the backend sent null
    pub value: Option<String>,
}

/// A raw record could not be turned into a display record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("record {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// The content backend could not be reached or answered badly
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("repository at {0} has no master ref")]
    NoMasterRef(String),

    #[error("fixtures: {0}")]
    Fixtures(String),
}

/// Failure of a flow operation as seen by the rendering boundary
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no post with identifier `{0}`")]
    NotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Map(#[from] MapError),
}
