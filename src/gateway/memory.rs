//! In-memory gateway

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::num::NonZeroU32;

use super::{ContentGateway, GatewayError};
use crate::content::{AdjacentPosts, ListingPage, PageToken, PostDetail};

const TOKEN_PREFIX: &str = "memory:";

/// Serves a fixed list of posts, paginated in the order given
///
/// Tokens have the form `memory:<offset>:<page size>`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    posts: Vec<PostDetail>,
}

impl InMemoryGateway {
    pub fn new(posts: Vec<PostDetail>) -> Self {
        Self { posts }
    }

    fn parse_token(token: &PageToken) -> Result<(usize, usize), GatewayError> {
        let invalid = || GatewayError::InvalidToken(token.to_string());
        let rest = token.as_str().strip_prefix(TOKEN_PREFIX).ok_or_else(invalid)?;
        let (offset, size) = rest.split_once(':').ok_or_else(invalid)?;
        let offset: usize = offset.parse().map_err(|_| invalid())?;
        let size: usize = size.parse().map_err(|_| invalid())?;
        if size == 0 {
            return Err(invalid());
        }
        // the page end must be representable
        offset.checked_add(size).ok_or_else(invalid)?;
        Ok((offset, size))
    }
}

#[async_trait]
impl ContentGateway for InMemoryGateway {
    async fn fetch_listing_page(
        &self,
        page_size: NonZeroU32,
        token: Option<&PageToken>,
    ) -> Result<ListingPage, GatewayError> {
        let (offset, size) = match token {
            Some(token) => Self::parse_token(token)?,
            None => (0, page_size.get() as usize),
        };

        let end = (offset + size).min(self.posts.len());
        let items = self
            .posts
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(PostDetail::summary)
            .collect();
        let next_token = (end < self.posts.len())
            .then(|| PageToken::new(format!("{}{}:{}", TOKEN_PREFIX, end, size)));

        Ok(ListingPage { items, next_token })
    }

    async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, GatewayError> {
        Ok(self.posts.iter().find(|p| p.id == slug).cloned())
    }

    /// Equal timestamps are never adjacent; among several candidates with
    /// the same date the first one in list order wins.
    async fn fetch_adjacent_posts(
        &self,
        published_at: DateTime<Utc>,
    ) -> Result<AdjacentPosts, GatewayError> {
        let mut before: Option<(&PostDetail, DateTime<Utc>)> = None;
        let mut after: Option<(&PostDetail, DateTime<Utc>)> = None;

        for post in &self.posts {
            let Some(date) = post.published_at else {
                continue;
            };
            if date < published_at && before.map_or(true, |(_, best)| date > best) {
                before = Some((post, date));
            }
            if date > published_at && after.map_or(true, |(_, best)| date < best) {
                after = Some((post, date));
            }
        }

        Ok(AdjacentPosts {
            before: before.map(|(p, _)| p.summary()),
            after: after.map(|(p, _)| p.summary()),
        })
    }
}
