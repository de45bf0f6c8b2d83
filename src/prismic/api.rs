//! Wire types of the Prismic REST API v2

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Response of the API root (`GET {endpoint}`)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    pub refs: Vec<Ref>,
}

impl ApiInfo {
    /// The ref of the published content
    pub fn master_ref(&self) -> Option<&Ref> {
        self.refs.iter().find(|r| r.is_master_ref)
    }
}

/// A content release
#[derive(Debug, Clone, Deserialize)]
pub struct Ref {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of `documents/search` results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<Document<T>>,
}

/// A document as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub first_publication_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_publication_date: Option<DateTime<Utc>>,
    pub data: T,
}

/// The `data` object of a `post` document
///
/// Every field is optional so that queries restricted with `fetch`
/// still deserialize.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostFields {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub banner: ImageField,
    pub content: Vec<ContentSlice>,
}

/// An image field; empty images come back as `{}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageField {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// One entry of the `content` group
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentSlice {
    pub heading: Option<String>,
    pub body: Vec<RichTextBlock>,
}

/// A rich-text block (paragraph, heading, list item, image, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default)]
    pub label: Option<String>,
    // image blocks
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    // embed blocks
    #[serde(default)]
    pub oembed: Option<serde_json::Value>,
}

/// Inline formatting over a character range of a block's text
#[derive(Debug, Clone, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Prismic writes offsets as `+0000`, which RFC 3339 parsing rejects
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_prismic_timestamp() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        assert_eq!(parse_timestamp("2021-03-25T19:25:28+0000"), Some(expected));
        assert_eq!(parse_timestamp("2021-03-25T16:25:28-03:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_deserialize_document() {
        let json = r#"{
            "id": "YFzD",
            "uid": "como-utilizar-hooks",
            "type": "post",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": null,
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                "author": "Joseph Oliveira",
                "banner": {},
                "content": [
                    {"heading": "Proin et varius", "body": [
                        {"type": "paragraph", "text": "Lorem ipsum", "spans": []}
                    ]}
                ]
            }
        }"#;
        let doc: Document<PostFields> = serde_json::from_str(json).unwrap();
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert!(doc.first_publication_date.is_some());
        assert!(doc.last_publication_date.is_none());
        assert!(doc.data.banner.url.is_none());
        assert_eq!(doc.data.content.len(), 1);
        assert_eq!(doc.data.content[0].body[0].kind, "paragraph");
    }

    #[test]
    fn test_malformed_title_is_rejected() {
        let json = r#"{"id": "x", "type": "post", "data": {"title": 42}}"#;
        assert!(serde_json::from_str::<Document<PostFields>>(json).is_err());
    }
}
