//! List posts available from the content API

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;

use crate::content::{ListingViewModel, PostSummary};
use crate::gateway::ContentGateway;
use crate::helpers::Helpers;
use crate::Spacetraveling;

/// Print every post, loading pages until the listing is exhausted
pub async fn run(site: &Spacetraveling) -> Result<()> {
    let gateway = site.gateway()?;
    let stdout = std::io::stdout();
    write_listing(site, gateway, &mut stdout.lock()).await
}

pub async fn write_listing<W: Write>(
    site: &Spacetraveling,
    gateway: Arc<dyn ContentGateway>,
    out: &mut W,
) -> Result<()> {
    let helpers = Helpers::new(&site.config)?;
    let listing = ListingViewModel::load(gateway, site.config.prismic.page_size).await?;
    listing.load_all().await?;

    let posts = listing.items().await;
    writeln!(out, "Posts ({}):", posts.len())?;
    for post in &posts {
        writeln!(out, "  {}", format_line(&helpers, post))?;
    }

    Ok(())
}

fn format_line(helpers: &Helpers, post: &PostSummary) -> String {
    let date = post
        .published_at
        .map(|d| helpers.date(&d))
        .unwrap_or_else(|| "unpublished".to_string());
    format!("{} - {} by {} [{}]", date, post.title, post.author, post.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::PostDetail;
    use crate::gateway::InMemoryGateway;
    use chrono::{TimeZone, Utc};
    use std::num::NonZeroU32;

    fn post(id: &str, day: u32) -> PostDetail {
        PostDetail {
            id: id.to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2021, 3, day, 0, 0, 0).unwrap()),
            updated_at: None,
            title: format!("Title {}", id),
            subtitle: None,
            author: "Ana".to_string(),
            banner_url: String::new(),
            sections: Vec::new(),
            word_count: 0,
        }
    }

    #[tokio::test]
    async fn test_lists_all_pages() {
        let mut config = SiteConfig::default();
        config.prismic.page_size = NonZeroU32::new(2).unwrap();
        let site = Spacetraveling::with_config("/tmp/unused", config);
        let gateway = Arc::new(InMemoryGateway::new(vec![
            post("a", 15),
            post("b", 16),
            post("c", 17),
        ]));

        let mut out = Vec::new();
        write_listing(&site, gateway, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Posts (3):"));
        assert!(text.contains("15 Mar 2021 - Title a by Ana [a]"));
        assert!(text.contains("[c]"));
    }
}
