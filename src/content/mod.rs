//! Content module - raw backend documents and the display models built from them

mod record;
mod view;

pub use record::{RawBlock, RawFields, RawImage, RawPage, RawRecord, RawSpan};
pub use view::{ContentSection, DisplayPostDetail, DisplayPostSummary, Mapper};
