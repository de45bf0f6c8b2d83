//! HTTP client for the Prismic REST API v2

use serde::de::DeserializeOwned;
use std::fmt;
use std::num::NonZeroU32;
use tokio::sync::OnceCell;
use url::Url;

use super::api::{ApiInfo, Document, SearchResponse};
use super::predicates::{orderings_string, query_string, Ordering, Predicate};
use crate::gateway::GatewayError;

/// Options of a `documents/search` call
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub page_size: Option<NonZeroU32>,
    /// Restrict the returned `data` fields, e.g. `post.title`
    pub fetch: Vec<String>,
    pub orderings: Vec<Ordering>,
}

/// Thin client over the search API
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl fmt::Debug for PrismicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrismicClient")
            .field("http", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PrismicClient {
    /// Create a client for an API root such as `https://repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, GatewayError> {
        Self::with_http_client(reqwest::Client::new(), endpoint, access_token)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        endpoint: &str,
        access_token: Option<String>,
    ) -> Result<Self, GatewayError> {
        // fail early on a bad endpoint instead of at the first query
        Url::parse(endpoint)?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.filter(|t| !t.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    /// Resolve the master ref once per client
    async fn master_ref(&self) -> Result<&str, GatewayError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let mut url = Url::parse(&self.endpoint)?;
                self.authorize(&mut url);
                let info: ApiInfo = self.get_json(url).await?;
                let master = info.master_ref().ok_or(GatewayError::NoMasterRef)?;
                tracing::debug!("Resolved master ref {}", master.reference);
                Ok::<_, GatewayError>(master.reference.clone())
            })
            .await?;
        Ok(reference.as_str())
    }

    /// Run a search against the master ref
    pub async fn query<T: DeserializeOwned>(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse<T>, GatewayError> {
        let reference = self.master_ref().await?;
        let mut url = Url::parse(&format!("{}/documents/search", self.endpoint))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);
            pairs.append_pair("q", &query_string(predicates));
            if let Some(page_size) = options.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
            if !options.fetch.is_empty() {
                pairs.append_pair("fetch", &options.fetch.join(","));
            }
            if !options.orderings.is_empty() {
                pairs.append_pair("orderings", &orderings_string(&options.orderings));
            }
        }
        self.authorize(&mut url);
        self.get_json(url).await
    }

    /// Follow a `next_page` URL returned by a previous search
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        page_url: &str,
    ) -> Result<SearchResponse<T>, GatewayError> {
        let mut url = Url::parse(page_url)?;
        self.authorize(&mut url);
        self.get_json(url).await
    }

    /// Fetch the first document of `doc_type` whose uid is `uid`
    pub async fn get_by_uid<T: DeserializeOwned>(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> Result<Option<Document<T>>, GatewayError> {
        let predicates = [Predicate::at(&format!("my.{}.uid", doc_type), uid)];
        let response: SearchResponse<T> = self.query(&predicates, &QueryOptions::default()).await?;
        Ok(response.results.into_iter().next())
    }

    /// Add the access token unless the URL already carries one
    fn authorize(&self, url: &mut Url) {
        if let Some(token) = &self.access_token {
            if !url.query_pairs().any(|(k, _)| k == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        tracing::debug!("GET {}", redact(&url));
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status,
                url: redact(&url),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// URL without the access token, for logs and errors
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
