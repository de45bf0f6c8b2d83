//! Prismic content API client
//!
//! Wire types, query building, the HTTP client and the rich-text renderer.
//! Nothing here knows about the blog's view models; see `crate::gateway`.

pub mod api;
mod client;
pub mod predicates;
pub mod richtext;

pub use api::{Document, PostFields, RichTextBlock, SearchResponse};
pub use client::{PrismicClient, QueryOptions};
pub use predicates::{Ordering, Predicate};
