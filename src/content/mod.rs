//! Content module - post view models and the listing view-model

mod listing;
mod post;

pub use listing::{ListingViewModel, LoadOutcome};
pub use post::{AdjacentPosts, ListingPage, PageToken, PostDetail, PostPage, PostSummary, Section};
