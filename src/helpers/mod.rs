//! Helper functions for templates and view models
//!
//! Date formatting and URL generation shared by the mapper and the page server.

mod date;
mod url;

pub use date::*;
pub use url::*;
