//! Post view models

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::prismic::{richtext, Document, PostFields};

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    /// Document uid, used as slug
    pub id: String,

    /// First publication date
    pub published_at: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    /// Keep only the listing fields of a document
    ///
    /// Returns `None` for documents without a uid; they cannot be linked.
    pub fn from_document(doc: Document<PostFields>) -> Option<Self> {
        let id = doc.uid.filter(|uid| !uid.is_empty())?;
        Some(Self {
            id,
            published_at: doc.first_publication_date,
            title: doc.data.title.unwrap_or_default(),
            subtitle: doc.data.subtitle.unwrap_or_default(),
            author: doc.data.author.unwrap_or_default(),
        })
    }
}

/// A titled block of post content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body_html: String,
}

/// A full post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub id: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    /// Empty when the post has no banner
    pub banner_url: String,
    /// In source order
    pub sections: Vec<Section>,
    /// Words in headings and body text
    pub word_count: usize,
}

impl PostDetail {
    /// Normalize a full document; `slug` is used if the document lacks a uid
    pub fn from_document(doc: Document<PostFields>, slug: &str) -> Self {
        let mut word_count = 0;
        let sections = doc
            .data
            .content
            .into_iter()
            .map(|slice| {
                let heading = slice.heading.unwrap_or_default();
                word_count += heading.split_whitespace().count();
                word_count += richtext::as_text(&slice.body).split_whitespace().count();
                Section {
                    heading,
                    body_html: richtext::as_html(&slice.body),
                }
            })
            .collect();

        Self {
            id: doc
                .uid
                .filter(|uid| !uid.is_empty())
                .unwrap_or_else(|| slug.to_string()),
            published_at: doc.first_publication_date,
            updated_at: doc.last_publication_date,
            title: doc.data.title.unwrap_or_default(),
            subtitle: doc.data.subtitle.filter(|s| !s.is_empty()),
            author: doc.data.author.unwrap_or_default(),
            banner_url: doc.data.banner.url.unwrap_or_default(),
            sections,
            word_count,
        }
    }

    /// Estimated reading time in whole minutes, rounded up
    pub fn reading_time(&self, words_per_minute: u32) -> usize {
        let wpm = words_per_minute.max(1) as usize;
        self.word_count.div_ceil(wpm)
    }

    /// Whether the post was republished after its first publication
    pub fn was_edited(&self) -> bool {
        match (self.published_at, self.updated_at) {
            (Some(published), Some(updated)) => updated != published,
            (None, Some(_)) => true,
            _ => false,
        }
    }

    /// The listing view of this post
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id.clone(),
            published_at: self.published_at,
            title: self.title.clone(),
            subtitle: self.subtitle.clone().unwrap_or_default(),
            author: self.author.clone(),
        }
    }
}

/// Opaque pagination cursor handed out by the content API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fetched batch of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// In the order the content API returned them
    pub items: Vec<PostSummary>,
    /// Present while more pages exist
    pub next_token: Option<PageToken>,
}

/// Neighbours of a post by publication date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacentPosts {
    /// Most recent post published strictly earlier
    pub before: Option<PostSummary>,
    /// Earliest post published strictly later
    pub after: Option<PostSummary>,
}

/// What a post route renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostPage {
    /// The post is being fetched in the background
    Loading,
    Found {
        post: PostDetail,
        adjacent: AdjacentPosts,
    },
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document<PostFields> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_summary_keeps_listing_fields_only() {
        let doc = document(json!({
            "id": "X1",
            "uid": "hello-world",
            "type": "post",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {"title": "Hello", "subtitle": "World", "author": "Ana",
                     "banner": {"url": "https://img/x.png"}}
        }));
        let summary = PostSummary::from_document(doc).unwrap();
        assert_eq!(summary.id, "hello-world");
        assert_eq!(summary.title, "Hello");
        assert_eq!(summary.subtitle, "World");
        assert_eq!(summary.author, "Ana");
        assert!(summary.published_at.is_some());
    }

    #[test]
    fn test_summary_requires_uid() {
        let no_uid = document(json!({"id": "X1", "type": "post", "data": {}}));
        assert!(PostSummary::from_document(no_uid).is_none());
        let empty_uid = document(json!({"id": "X1", "uid": "", "type": "post", "data": {}}));
        assert!(PostSummary::from_document(empty_uid).is_none());
    }

    #[test]
    fn test_detail_sections_preserve_order() {
        let doc = document(json!({
            "id": "X1",
            "uid": "hooks",
            "type": "post",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-20T10:00:00+0000",
            "data": {
                "title": "Hooks",
                "author": "Ana",
                "banner": {},
                "content": [
                    {"heading": "First part", "body": [
                        {"type": "paragraph", "text": "one two three", "spans": []}
                    ]},
                    {"heading": "Second", "body": []}
                ]
            }
        }));
        let post = PostDetail::from_document(doc, "hooks");
        assert_eq!(post.sections.len(), 2);
        assert_eq!(post.sections[0].heading, "First part");
        assert_eq!(post.sections[0].body_html, "<p>one two three</p>");
        assert_eq!(post.sections[1].heading, "Second");
        assert_eq!(post.sections[1].body_html, "");
        assert_eq!(post.word_count, 6);
        assert_eq!(post.banner_url, "");
        assert_eq!(post.subtitle, None);
        assert!(post.was_edited());
    }

    #[test]
    fn test_detail_without_content_is_valid() {
        let doc = document(json!({"id": "X1", "type": "post", "data": {"title": "Empty"}}));
        let post = PostDetail::from_document(doc, "empty");
        assert_eq!(post.id, "empty");
        assert!(post.sections.is_empty());
        assert_eq!(post.reading_time(200), 0);
        assert!(!post.was_edited());
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let mut post = PostDetail::from_document(
            document(json!({"id": "X1", "uid": "a", "type": "post", "data": {}})),
            "a",
        );
        post.word_count = 201;
        assert_eq!(post.reading_time(200), 2);
        post.word_count = 200;
        assert_eq!(post.reading_time(200), 1);
    }
}
