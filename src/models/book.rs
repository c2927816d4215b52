//! Book summaries, pagination and instant-search payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Matched-term markers emitted by the search backend
static HIGHLIGHT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<(em|mark)>(.*?)</(?:em|mark)>").expect("valid marker pattern"));

/// Highlighted fragments returned alongside a book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Unit rendered by the result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub language: Option<String>,
    pub price: Option<f64>,
    pub published_year: Option<i32>,
    pub cover_url: Option<String>,
    pub highlight: Option<Highlight>,
}

/// Piece of a highlighted fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub matched: bool,
}

impl BookSummary {
    /// Title fragment to render, highlighted when available
    pub fn display_title(&self) -> &str {
        self.highlight
            .as_ref()
            .and_then(|h| h.title.as_deref())
            .unwrap_or(&self.title)
    }

    pub fn display_description(&self) -> Option<&str> {
        self.highlight
            .as_ref()
            .and_then(|h| h.description.as_deref())
            .or(self.description.as_deref())
    }

    pub fn title_segments(&self) -> Vec<TextSegment> {
        highlight_segments(self.display_title())
    }
}

/// Split a fragment on `<em>`/`<mark>` markers into matched and plain segments.
/// A fragment without markers yields a single unmatched segment.
pub fn highlight_segments(fragment: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in HIGHLIGHT_MARKER.captures_iter(fragment) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if whole.start() > cursor {
            segments.push(TextSegment {
                text: fragment[cursor..whole.start()].to_string(),
                matched: false,
            });
        }
        if !inner.as_str().is_empty() {
            segments.push(TextSegment {
                text: inner.as_str().to_string(),
                matched: true,
            });
        }
        cursor = whole.end();
    }

    if cursor < fragment.len() {
        segments.push(TextSegment {
            text: fragment[cursor..].to_string(),
            matched: false,
        });
    }
    segments
}

/// Pagination block of a catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            page_size: 20,
        }
    }
}

impl Pagination {
    /// Enforce `1 <= current_page <= total_pages` and a positive page size
    pub fn sanitized(self) -> Self {
        let total_pages = self.total_pages.max(1);
        Self {
            current_page: self.current_page.clamp(1, total_pages),
            total_pages,
            total_items: self.total_items,
            page_size: self.page_size.max(1),
        }
    }

    /// Pagination describing the items of `page`. A backend reporting fewer
    /// pages than the one it just served is trusted for the items, not the total.
    pub fn for_page(self, page: u32) -> Self {
        let page = page.max(1);
        if self.total_pages < page {
            tracing::debug!(
                "Backend reported {} page(s) while serving page {}",
                self.total_pages,
                page
            );
        }
        Self {
            current_page: page,
            total_pages: self.total_pages.max(page),
            ..self
        }
        .sanitized()
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Body of `GET /catalog/filter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub result: Vec<BookSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionText {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionGroups {
    #[serde(default)]
    pub titles: Vec<SuggestionText>,
    #[serde(default)]
    pub authors: Vec<SuggestionText>,
}

/// Body of `GET /search/instant`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstantSearchResponse {
    #[serde(default)]
    pub suggestions: SuggestionGroups,
    #[serde(default)]
    pub books: Vec<BookSummary>,
}

/// Decode a body that is either bare or wrapped in `{ "data": ... }`.
/// A null `data` yields `Ok(None)`.
pub fn unwrap_data<T: DeserializeOwned>(body: Value) -> Result<Option<T>, serde_json::Error> {
    let inner = match body {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    if inner.is_null() {
        return Ok(None);
    }
    serde_json::from_value(inner).map(Some)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}
