//! Content gateway - the boundary between the blog and the content API
//!
//! [`ContentGateway`] is what the listing view-model, the generator and the
//! preview server talk to. [`PrismicGateway`] implements it over the
//! Prismic REST API; [`InMemoryGateway`] serves a fixed set of posts.

mod error;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::num::NonZeroU32;

pub use error::GatewayError;
pub use memory::InMemoryGateway;

use crate::config::PrismicConfig;
use crate::content::{AdjacentPosts, ListingPage, PageToken, PostDetail, PostSummary};
use crate::prismic::{Ordering, Predicate, PostFields, PrismicClient, QueryOptions, SearchResponse};

/// Largest page size the content API accepts
const MAX_PAGE_SIZE: u32 = 100;

const PUBLICATION_DATE: &str = "document.first_publication_date";

/// Results requested per neighbour query, so a closest document without a
/// uid does not hide a linkable one behind it
const NEIGHBOUR_WINDOW: u32 = 5;

#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Fetch one listing page. Without a token this is the first page in
    /// the API's default order; with a token `page_size` is ignored since
    /// the token already carries it.
    async fn fetch_listing_page(
        &self,
        page_size: NonZeroU32,
        token: Option<&PageToken>,
    ) -> Result<ListingPage, GatewayError>;

    /// Fetch a full post. `None` when the API has no document for the slug.
    async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, GatewayError>;

    /// Posts published immediately before and after `published_at`
    async fn fetch_adjacent_posts(
        &self,
        published_at: DateTime<Utc>,
    ) -> Result<AdjacentPosts, GatewayError>;

    /// Every post slug, walking all listing pages
    async fn fetch_all_slugs(&self) -> Result<Vec<String>, GatewayError> {
        let page_size = NonZeroU32::new(MAX_PAGE_SIZE).unwrap_or(NonZeroU32::MIN);
        let mut slugs = Vec::new();
        let mut token: Option<PageToken> = None;

        loop {
            let page = self.fetch_listing_page(page_size, token.as_ref()).await?;
            slugs.extend(page.items.into_iter().map(|p| p.id));
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(slugs)
    }
}

/// Gateway backed by the Prismic REST API
#[derive(Debug)]
pub struct PrismicGateway {
    client: PrismicClient,
    document_type: String,
}

impl PrismicGateway {
    pub fn new(client: PrismicClient, document_type: &str) -> Self {
        Self {
            client,
            document_type: document_type.to_string(),
        }
    }

    /// Build a gateway from the `prismic` section of the site config
    pub fn from_config(config: &PrismicConfig) -> Result<Self, GatewayError> {
        let client = PrismicClient::new(&config.endpoint, config.access_token.clone())?;
        Ok(Self::new(client, &config.document_type))
    }

    fn type_predicate(&self) -> Predicate {
        Predicate::at("document.type", &self.document_type)
    }

    fn summary_fields(&self) -> Vec<String> {
        ["title", "subtitle", "author"]
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect()
    }

    /// First result of a one-item query ordered by publication date
    async fn single_neighbour(
        &self,
        predicate: Predicate,
        ordering: Ordering,
    ) -> Result<Option<PostSummary>, GatewayError> {
        let options = QueryOptions {
            page_size: NonZeroU32::new(NEIGHBOUR_WINDOW),
            fetch: self.summary_fields(),
            orderings: vec![ordering],
        };
        let response: SearchResponse<PostFields> = self
            .client
            .query(&[self.type_predicate(), predicate], &options)
            .await?;
        Ok(response
            .results
            .into_iter()
            .find_map(PostSummary::from_document))
    }
}

#[async_trait]
impl ContentGateway for PrismicGateway {
    async fn fetch_listing_page(
        &self,
        page_size: NonZeroU32,
        token: Option<&PageToken>,
    ) -> Result<ListingPage, GatewayError> {
        let response: SearchResponse<PostFields> = match token {
            Some(token) => self.client.get_page(token.as_str()).await?,
            None => {
                let options = QueryOptions {
                    page_size: Some(page_size),
                    fetch: self.summary_fields(),
                    orderings: Vec::new(),
                };
                self.client.query(&[self.type_predicate()], &options).await?
            }
        };

        tracing::debug!(
            "Fetched listing page {} of {} ({} results)",
            response.page,
            response.total_pages,
            response.results.len()
        );

        let items = response
            .results
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                let summary = PostSummary::from_document(doc);
                if summary.is_none() {
                    tracing::warn!("Dropping document {} without uid from listing", id);
                }
                summary
            })
            .collect();

        Ok(ListingPage {
            items,
            next_token: response
                .next_page
                .filter(|url| !url.is_empty())
                .map(PageToken::new),
        })
    }

    /// Walks the listing with `fetch` restricted to the uid field; the uid
    /// itself lives in the document metadata, so `data` comes back empty
    async fn fetch_all_slugs(&self) -> Result<Vec<String>, GatewayError> {
        let options = QueryOptions {
            page_size: NonZeroU32::new(MAX_PAGE_SIZE),
            fetch: vec![format!("{}.uid", self.document_type)],
            orderings: Vec::new(),
        };
        let mut response: SearchResponse<PostFields> =
            self.client.query(&[self.type_predicate()], &options).await?;
        let mut slugs = Vec::new();

        loop {
            slugs.extend(
                response
                    .results
                    .into_iter()
                    .filter_map(|doc| doc.uid.filter(|uid| !uid.is_empty())),
            );
            match response.next_page.filter(|url| !url.is_empty()) {
                Some(next) => response = self.client.get_page(&next).await?,
                None => break,
            }
        }

        tracing::debug!("Found {} post slugs", slugs.len());
        Ok(slugs)
    }

    async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, GatewayError> {
        let document = self
            .client
            .get_by_uid::<PostFields>(&self.document_type, slug)
            .await?;
        Ok(document.map(|doc| PostDetail::from_document(doc, slug)))
    }

    async fn fetch_adjacent_posts(
        &self,
        published_at: DateTime<Utc>,
    ) -> Result<AdjacentPosts, GatewayError> {
        let before = self
            .single_neighbour(
                Predicate::date_before(PUBLICATION_DATE, published_at),
                Ordering::desc(PUBLICATION_DATE),
            )
            .await?;
        let after = self
            .single_neighbour(
                Predicate::date_after(PUBLICATION_DATE, published_at),
                Ordering::asc(PUBLICATION_DATE),
            )
            .await?;
        Ok(AdjacentPosts { before, after })
    }
}
