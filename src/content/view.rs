//! Display models and the mapper that builds them from raw records

use serde::{Deserialize, Serialize};

use super::record::{RawBlock, RawRecord};
use crate::error::MapError;
use crate::helpers::DateFormatter;

/// A post as shown on the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPostSummary {
    /// Identifier used in the post URL
    pub id: String,

    /// Formatted publication date
    pub date: String,

    pub title: String,

    pub subtitle: String,

    pub author: String,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPostDetail {
    pub id: String,

    /// Formatted publication date
    pub date: String,

    pub title: String,

    pub subtitle: String,

    pub author: String,

    /// Banner image, when the post has one
    pub banner_url: Option<String>,

    /// Body, in the order the backend sent it
    pub sections: Vec<ContentSection>,

    /// Estimated reading time in minutes
    pub reading_time: u32,
}

/// A heading and the paragraphs under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl From<&RawBlock> for ContentSection {
    fn from(block: &RawBlock) -> Self {
        Self {
            heading: block.heading.clone().unwrap_or_default(),
            paragraphs: block.body.iter().map(|span| span.text.clone()).collect(),
        }
    }
}

/// Maps raw records into display records
///
/// Holds formatting settings only; mapping never performs I/O.
#[derive(Debug, Clone)]
pub struct Mapper {
    dates: DateFormatter,
    words_per_minute: u32,
    date_placeholder: String,
}

impl Mapper {
    /// Create a new mapper
    pub fn new(dates: DateFormatter, words_per_minute: u32, date_placeholder: &str) -> Self {
        Self {
            dates,
            words_per_minute: words_per_minute.max(1),
            date_placeholder: date_placeholder.to_string(),
        }
    }

    /// Map a record into a listing summary
    pub fn map_summary(&self, raw: &RawRecord) -> Result<DisplayPostSummary, MapError> {
        let (title, author) = required_fields(raw)?;
        let date = self.dates.format(raw.first_publication_date.as_deref())?;

        Ok(DisplayPostSummary {
            id: raw.identifier().to_string(),
            date,
            title,
            subtitle: raw.data.subtitle.clone().unwrap_or_default(),
            author,
        })
    }

    /// Map a record into a full post
    pub fn map_detail(&self, raw: &RawRecord) -> Result<DisplayPostDetail, MapError> {
        let (title, author) = required_fields(raw)?;
        let date = self.dates.format(raw.first_publication_date.as_deref())?;
        Ok(self.build_detail(raw, date, title, author))
    }

    /// Map a record for its page.
    ///
    /// An unusable date is logged and shown as the placeholder; a missing
    /// required field is still an error.
    pub fn present_detail(&self, raw: &RawRecord) -> Result<DisplayPostDetail, MapError> {
        match self.map_detail(raw) {
            Err(MapError::Format(e)) => {
                tracing::warn!("Post {}: {}", raw.identifier(), e);
                let (title, author) = required_fields(raw)?;
                Ok(self.build_detail(raw, self.date_placeholder.clone(), title, author))
            }
            other => other,
        }
    }

    fn build_detail(
        &self,
        raw: &RawRecord,
        date: String,
        title: String,
        author: String,
    ) -> DisplayPostDetail {
        let sections: Vec<ContentSection> =
            raw.data.content.iter().map(ContentSection::from).collect();
        let reading_time = self.reading_time(&sections);

        DisplayPostDetail {
            id: raw.identifier().to_string(),
            date,
            title,
            subtitle: raw.data.subtitle.clone().unwrap_or_default(),
            author,
            banner_url: raw
                .data
                .banner
                .as_ref()
                .and_then(|b| b.url.clone())
                .filter(|url| !url.is_empty()),
            sections,
            reading_time,
        }
    }

    /// Map a page of records for the listing.
    ///
    /// Records with an unusable date keep the placeholder date; records
    /// missing a required field are left out. Both are logged.
    pub fn summarize(&self, records: &[RawRecord]) -> Vec<DisplayPostSummary> {
        records
            .iter()
            .filter_map(|raw| match self.map_summary(raw) {
                Ok(summary) => Some(summary),
                Err(MapError::Format(e)) => {
                    tracing::warn!("Post {}: {}", raw.identifier(), e);
                    let (title, author) = required_fields(raw).ok()?;
                    Some(DisplayPostSummary {
                        id: raw.identifier().to_string(),
                        date: self.date_placeholder.clone(),
                        title,
                        subtitle: raw.data.subtitle.clone().unwrap_or_default(),
                        author,
                    })
                }
                Err(e) => {
                    tracing::warn!("Skipping post: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Minutes needed to read the headings and paragraphs, at least one
    pub fn reading_time(&self, sections: &[ContentSection]) -> u32 {
        let words: usize = sections
            .iter()
            .map(|s| {
                count_words(&s.heading) + s.paragraphs.iter().map(|p| count_words(p)).sum::<usize>()
            })
            .sum();

        let minutes = words.div_ceil(self.words_per_minute as usize);
        u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
    }
}

fn required_fields(raw: &RawRecord) -> Result<(String, String), MapError> {
    let field = |value: &Option<String>, name: &'static str| {
        value
            .clone()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| MapError::MissingField {
                id: raw.identifier().to_string(),
                field: name,
            })
    };

    Ok((
        field(&raw.data.title, "title")?,
        field(&raw.data.author, "author")?,
    ))
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::record::{RawFields, RawImage, RawSpan};
    use crate::error::FormatError;
    use crate::i18n::Locale;

    fn mapper() -> Mapper {
        let dates = DateFormatter::new(Locale::PtBr.strings().unwrap(), None);
        Mapper::new(dates, 200, "--")
    }

    fn block(heading: &str, paragraphs: &[&str]) -> RawBlock {
        RawBlock {
            heading: Some(heading.to_string()),
            body: paragraphs
                .iter()
                .map(|text| RawSpan {
                    kind: "paragraph".to_string(),
                    text: text.to_string(),
                    spans: Vec::new(),
                })
                .collect(),
        }
    }

    fn record(uid: &str) -> RawRecord {
        RawRecord {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            document_type: Some("posts".to_string()),
            first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            last_publication_date: Some("2021-03-20T10:00:00+0000".to_string()),
            data: RawFields {
                title: Some("Como utilizar Hooks".to_string()),
                subtitle: Some("Pensando em sincronização".to_string()),
                author: Some("Joseph Oliveira".to_string()),
                banner: Some(RawImage {
                    url: Some("https://images.prismic.io/banner.png".to_string()),
                    alt: None,
                }),
                content: vec![block("Intro", &["a", "b"]), block("End", &["c"])],
            },
        }
    }

    #[test]
    fn test_map_summary() {
        let summary = mapper().map_summary(&record("hooks")).unwrap();
        assert_eq!(summary.id, "hooks");
        assert_eq!(summary.date, "15 Mar 2021");
        assert_eq!(summary.title, "Como utilizar Hooks");
        assert_eq!(summary.subtitle, "Pensando em sincronização");
        assert_eq!(summary.author, "Joseph Oliveira");
    }

    #[test]
    fn test_map_detail_preserves_order() {
        let detail = mapper().map_detail(&record("hooks")).unwrap();
        assert_eq!(
            detail.sections,
            vec![
                ContentSection {
                    heading: "Intro".to_string(),
                    paragraphs: vec!["a".to_string(), "b".to_string()],
                },
                ContentSection {
                    heading: "End".to_string(),
                    paragraphs: vec!["c".to_string()],
                },
            ]
        );
        assert_eq!(
            detail.banner_url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let m = mapper();
        let raw = record("hooks");
        assert_eq!(m.map_summary(&raw).unwrap(), m.map_summary(&raw).unwrap());
        assert_eq!(m.map_detail(&raw).unwrap(), m.map_detail(&raw).unwrap());
    }

    #[test]
    fn test_missing_required_field() {
        let mut raw = record("hooks");
        raw.data.author = None;
        assert_eq!(
            mapper().map_summary(&raw),
            Err(MapError::MissingField {
                id: "hooks".to_string(),
                field: "author",
            })
        );

        raw.data.title = Some("   ".to_string());
        assert!(matches!(
            mapper().map_detail(&raw),
            Err(MapError::MissingField { field: "title", .. })
        ));
    }

    #[test]
    fn test_null_date_is_format_error() {
        let mut raw = record("hooks");
        raw.first_publication_date = None;
        assert_eq!(
            mapper().map_summary(&raw),
            Err(MapError::Format(FormatError { value: None }))
        );
    }

    #[test]
    fn test_present_detail_with_bad_date() {
        let m = mapper();
        let mut raw = record("hooks");
        raw.first_publication_date = None;
        assert!(matches!(m.map_detail(&raw), Err(MapError::Format(_))));

        let detail = m.present_detail(&raw).unwrap();
        assert_eq!(detail.date, "--");
        assert_eq!(detail.title, "Como utilizar Hooks");
        assert_eq!(detail.sections.len(), 2);

        raw.first_publication_date = Some("amanhã".to_string());
        assert_eq!(m.present_detail(&raw).unwrap().date, "--");

        raw.data.author = None;
        assert!(matches!(
            m.present_detail(&raw),
            Err(MapError::MissingField { field: "author", .. })
        ));
    }

    #[test]
    fn test_present_detail_keeps_good_date() {
        let m = mapper();
        let raw = record("hooks");
        assert_eq!(m.present_detail(&raw).unwrap(), m.map_detail(&raw).unwrap());
    }

    #[test]
    fn test_optional_fields() {
        let mut raw = record("hooks");
        raw.data.subtitle = None;
        raw.data.banner = None;
        raw.uid = None;

        let detail = mapper().map_detail(&raw).unwrap();
        assert_eq!(detail.id, "id-hooks");
        assert_eq!(detail.subtitle, "");
        assert_eq!(detail.banner_url, None);
    }

    #[test]
    fn test_summarize_skips_and_flags() {
        let mut undated = record("undated");
        undated.first_publication_date = Some("soon".to_string());
        let mut anonymous = record("anonymous");
        anonymous.data.author = None;

        let summaries = mapper().summarize(&[record("first"), anonymous, undated, record("last")]);
        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "undated", "last"]);
        assert_eq!(summaries[1].date, "--");
    }

    #[test]
    fn test_summarize_keeps_duplicates() {
        let summaries = mapper().summarize(&[record("same"), record("same")]);
        assert_eq!(summaries.len(), 2);
    }

    #[test]
    fn test_reading_time() {
        let m = mapper();
        let short = vec![ContentSection {
            heading: "Intro".to_string(),
            paragraphs: vec!["one two three".to_string()],
        }];
        assert_eq!(m.reading_time(&short), 1);
        assert_eq!(m.reading_time(&[]), 1);

        let long = vec![ContentSection {
            heading: String::new(),
            paragraphs: vec!["word ".repeat(401)],
        }];
        assert_eq!(m.reading_time(&long), 3);

        let slow = Mapper::new(DateFormatter::new(Locale::PtBr.strings().unwrap(), None), 1, "--");
        let many = vec![ContentSection {
            heading: String::new(),
            paragraphs: vec!["a ".repeat(5_000)],
        }];
        assert_eq!(slow.reading_time(&many), 5_000);
    }
}
