//! Listing view-model - the post list behind "load more"

use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{ListingPage, PageToken, PostSummary};
use crate::gateway::{ContentGateway, GatewayError};

/// Result of a [`ListingViewModel::load_more`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and this many items were appended
    Appended(usize),
    /// There is no next page; nothing was fetched
    Exhausted,
    /// Another load is in flight; nothing was fetched
    Busy,
}

#[derive(Debug)]
struct ListingState {
    items: Vec<PostSummary>,
    next_token: Option<PageToken>,
}

/// Accumulated post list plus the token of the next page
///
/// Items are append-only and kept in API order; duplicates across pages
/// are passed through. At most one fetch runs at a time.
pub struct ListingViewModel {
    gateway: Arc<dyn ContentGateway>,
    page_size: NonZeroU32,
    state: RwLock<ListingState>,
    in_flight: Mutex<()>,
}

impl ListingViewModel {
    /// Start from a first page fetched by the caller
    pub fn new(gateway: Arc<dyn ContentGateway>, page_size: NonZeroU32, first: ListingPage) -> Self {
        Self {
            gateway,
            page_size,
            state: RwLock::new(ListingState {
                items: first.items,
                next_token: first.next_token,
            }),
            in_flight: Mutex::new(()),
        }
    }

    /// Fetch the first page and build the view-model from it
    pub async fn load(
        gateway: Arc<dyn ContentGateway>,
        page_size: NonZeroU32,
    ) -> Result<Self, GatewayError> {
        let first = gateway.fetch_listing_page(page_size, None).await?;
        tracing::debug!("Loaded first listing page with {} posts", first.items.len());
        Ok(Self::new(gateway, page_size, first))
    }

    /// Snapshot of the accumulated items
    pub async fn items(&self) -> Vec<PostSummary> {
        self.state.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub async fn next_token(&self) -> Option<PageToken> {
        self.state.read().await.next_token.clone()
    }

    /// Whether "load more" should be offered
    pub async fn has_more(&self) -> bool {
        self.state.read().await.next_token.is_some()
    }

    /// Fetch the next page and append it
    ///
    /// Returns `Busy` without fetching when another load is pending. On
    /// error the state is left exactly as it was.
    pub async fn load_more(&self) -> Result<LoadOutcome, GatewayError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Load more ignored, a load is already in flight");
            return Ok(LoadOutcome::Busy);
        };
        self.fetch_next().await
    }

    /// Keep loading until the listing is exhausted; returns the number of
    /// items appended
    pub async fn load_all(&self) -> Result<usize, GatewayError> {
        let mut appended = 0;
        loop {
            let _guard = self.in_flight.lock().await;
            match self.fetch_next().await? {
                LoadOutcome::Appended(n) => appended += n,
                LoadOutcome::Exhausted | LoadOutcome::Busy => break,
            }
        }
        Ok(appended)
    }

    /// Caller must hold `in_flight`
    async fn fetch_next(&self) -> Result<LoadOutcome, GatewayError> {
        let Some(token) = self.next_token().await else {
            return Ok(LoadOutcome::Exhausted);
        };

        let page = self
            .gateway
            .fetch_listing_page(self.page_size, Some(&token))
            .await?;

        let count = page.items.len();
        let mut state = self.state.write().await;
        state.items.extend(page.items);
        state.next_token = page.next_token;
        tracing::debug!(
            "Appended {} posts ({} total, more: {})",
            count,
            state.items.len(),
            state.next_token.is_some()
        );

        Ok(LoadOutcome::Appended(count))
    }
}
