//! Generator module - renders the site from the content API into static HTML

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{
    AdjacentPosts, ListingViewModel, LoadOutcome, PostDetail, PostPage, PostSummary,
};
use crate::gateway::{ContentGateway, GatewayError};
use crate::helpers::{date_xml, html_escape, listing_path, post_path, Helpers};
use crate::templates::{
    ConfigData, LabelsData, NavPost, PaginationData, PostData, PostDetailData, TemplateRenderer,
    ASSETS,
};
use crate::Spacetraveling;

/// Seconds before the loading placeholder reloads itself
const LOADING_REFRESH_SECONDS: u32 = 2;

/// What a generation run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub index_pages: usize,
    pub posts: usize,
    pub skipped: usize,
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Spacetraveling,
    gateway: Arc<dyn ContentGateway>,
    renderer: TemplateRenderer,
    helpers: Helpers,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Spacetraveling, gateway: Arc<dyn ContentGateway>) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            gateway,
            renderer: TemplateRenderer::new()?,
            helpers: Helpers::new(&site.config)?,
        })
    }

    /// Generate the entire site
    ///
    /// Any content API failure aborts the run.
    pub async fn generate(&self) -> Result<GenerateStats> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.write_assets()?;
        self.copy_static_assets()?;

        let index_pages = self.generate_index_pages().await?;
        let (posts, skipped) = self.generate_post_pages().await?;
        self.generate_not_found_page()?;

        Ok(GenerateStats {
            index_pages,
            posts,
            skipped,
        })
    }

    /// Write the embedded theme assets
    fn write_assets(&self) -> Result<()> {
        for (path, content) in ASSETS {
            let output_path = self.site.public_dir.join(path);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_path, content)?;
        }
        Ok(())
    }

    /// Copy the site's static directory over the output, overriding theme assets
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            tracing::debug!("Copied asset: {:?}", relative);
        }

        Ok(())
    }

    /// Generate the listing: page 1 at the root, then one page per
    /// "load more" step, each showing everything loaded so far
    async fn generate_index_pages(&self) -> Result<usize> {
        let page_size = self.site.config.prismic.page_size;
        let listing = ListingViewModel::load(self.gateway.clone(), page_size).await?;
        let mut page_num = 1;

        loop {
            let items = listing.items().await;
            let has_more = listing.has_more().await;
            let html = self.render_index(&items, page_num, has_more)?;
            self.write_page(&listing_path(page_num), &html)?;

            if !has_more {
                break;
            }
            match listing.load_more().await? {
                LoadOutcome::Appended(_) => page_num += 1,
                LoadOutcome::Exhausted | LoadOutcome::Busy => break,
            }
        }

        tracing::info!(
            "Generated {} index pages with {} posts",
            page_num,
            listing.len().await
        );
        Ok(page_num)
    }

    /// Generate one page per post slug; returns (written, skipped)
    async fn generate_post_pages(&self) -> Result<(usize, usize)> {
        let slugs = self.gateway.fetch_all_slugs().await?;
        let mut written = 0;
        let mut skipped = 0;

        for slug in &slugs {
            match self.resolve_post(slug).await? {
                page @ PostPage::Found { .. } => {
                    let html = self.render_post_page(&page)?;
                    self.write_page(&post_path(slug), &html)?;
                    written += 1;
                }
                PostPage::NotFound | PostPage::Loading => {
                    tracing::warn!("Skipping post {}: no document returned", slug);
                    skipped += 1;
                }
            }
        }

        tracing::info!("Generated {} post pages", written);
        Ok((written, skipped))
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self.render_post_page(&PostPage::NotFound)?;
        let output_path = self.site.public_dir.join("404.html");
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Fetch a post and its neighbours
    pub async fn resolve_post(&self, slug: &str) -> Result<PostPage, GatewayError> {
        let Some(post) = self.gateway.fetch_post_by_slug(slug).await? else {
            return Ok(PostPage::NotFound);
        };

        let adjacent = match post.published_at {
            Some(published_at) => self.gateway.fetch_adjacent_posts(published_at).await?,
            None => AdjacentPosts::default(),
        };

        Ok(PostPage::Found { post, adjacent })
    }

    /// Resolve a post and write its page; returns whether it exists
    pub async fn generate_post(&self, slug: &str) -> Result<bool> {
        let page = self.resolve_post(slug).await?;
        if !matches!(page, PostPage::Found { .. }) {
            return Ok(false);
        }
        let html = self.render_post_page(&page)?;
        self.write_page(&post_path(slug), &html)?;
        Ok(true)
    }

    /// Render one listing page
    pub fn render_index(&self, posts: &[PostSummary], page_num: usize, has_more: bool) -> Result<String> {
        let pagination = PaginationData {
            next_link: if has_more {
                self.helpers.url_for(&listing_path(page_num + 1))
            } else {
                String::new()
            },
        };
        let posts: Vec<PostData> = posts.iter().map(|p| self.post_data(p)).collect();

        let mut context = self.create_base_context();
        context.insert("posts", &posts);
        context.insert("pagination", &pagination);
        context.insert(
            "canonical_url",
            &self.helpers.full_url_for(&listing_path(page_num)),
        );
        self.renderer.render("index.html", &context)
    }

    /// Render whatever a post route resolved to
    pub fn render_post_page(&self, page: &PostPage) -> Result<String> {
        let mut context = self.create_base_context();

        match page {
            PostPage::Loading => {
                context.insert("refresh_seconds", &LOADING_REFRESH_SECONDS);
                self.renderer.render("loading.html", &context)
            }
            PostPage::NotFound => self.renderer.render("not_found.html", &context),
            PostPage::Found { post, adjacent } => {
                context.insert("post", &self.post_detail_data(post));
                context.insert(
                    "canonical_url",
                    &self.helpers.full_url_for(&post_path(&post.id)),
                );
                if let Some(before) = &adjacent.before {
                    context.insert("prev_post", &self.nav_post(before));
                }
                if let Some(after) = &adjacent.after {
                    context.insert("next_post", &self.nav_post(after));
                }
                self.renderer.render("post.html", &context)
            }
        }
    }

    /// Render a generic error page
    pub fn render_error(&self, status: u16, message: &str) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("status", &status);
        context.insert("message", &html_escape(message));
        self.renderer.render("error.html", &context)
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.site.config;
        let labels = &config.labels;
        let config_data = ConfigData {
            title: html_escape(&config.title),
            description: html_escape(&config.description),
            language: config.locale.replace('_', "-"),
            url: config.url.clone(),
            root: self.helpers.url_for(""),
            version: env!("CARGO_PKG_VERSION").to_string(),
            labels: LabelsData {
                load_more: html_escape(&labels.load_more),
                loading: html_escape(&labels.loading),
                updated: html_escape(&labels.updated),
                previous: html_escape(&labels.previous),
                next: html_escape(&labels.next),
                not_found: html_escape(&labels.not_found),
                reading_time: html_escape(&labels.reading_time),
            },
        };

        let mut context = Context::new();
        context.insert("config", &config_data);
        context.insert("canonical_url", "");
        context
    }

    fn post_data(&self, post: &PostSummary) -> PostData {
        PostData {
            title: html_escape(&post.title),
            subtitle: html_escape(&post.subtitle),
            author: html_escape(&post.author),
            date: post
                .published_at
                .map(|d| self.helpers.date(&d))
                .unwrap_or_default(),
            datetime: post.published_at.map(|d| date_xml(&d)).unwrap_or_default(),
            url: self.helpers.post_url(&post.id),
        }
    }

    fn post_detail_data(&self, post: &PostDetail) -> PostDetailData {
        let sections = post
            .sections
            .iter()
            .map(|s| crate::content::Section {
                heading: html_escape(&s.heading),
                body_html: s.body_html.clone(),
            })
            .collect();

        let description = post
            .subtitle
            .as_deref()
            .map(html_escape)
            .or_else(|| post.sections.first().map(|s| s.body_html.clone()))
            .unwrap_or_default();

        PostDetailData {
            title: html_escape(&post.title),
            author: html_escape(&post.author),
            date: post
                .published_at
                .map(|d| self.helpers.date(&d))
                .unwrap_or_default(),
            datetime: post.published_at.map(|d| date_xml(&d)).unwrap_or_default(),
            updated: post
                .updated_at
                .filter(|_| post.was_edited())
                .map(|d| self.helpers.updated_date(&d)),
            banner_url: html_escape(&post.banner_url),
            description,
            reading_time: post.reading_time(self.site.config.words_per_minute),
            sections,
        }
    }

    fn nav_post(&self, post: &PostSummary) -> NavPost {
        NavPost {
            title: html_escape(&post.title),
            url: self.helpers.post_url(&post.id),
        }
    }

    /// Write `<dir>/index.html` under the public directory
    fn write_page(&self, dir: &str, html: &str) -> Result<()> {
        let output_path = self.site.public_dir.join(dir).join("index.html");
        write_file(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, content).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Section;
    use crate::gateway::InMemoryGateway;
    use chrono::{TimeZone, Utc};
    use std::num::NonZeroU32;

    fn post(id: &str, month: u32) -> PostDetail {
        PostDetail {
            id: id.to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2021, month, 15, 12, 0, 0).unwrap()),
            updated_at: None,
            title: format!("Post <{}>", id),
            subtitle: Some("A subtitle".to_string()),
            author: "Ana".to_string(),
            banner_url: "https://images.prismic.io/banner.png".to_string(),
            sections: vec![Section {
                heading: "Intro".to_string(),
                body_html: "<p>Hello <strong>world</strong></p>".to_string(),
            }],
            word_count: 450,
        }
    }

    fn site(dir: &Path, page_size: u32) -> Spacetraveling {
        let mut config = SiteConfig::default();
        config.prismic.page_size = NonZeroU32::new(page_size).unwrap();
        Spacetraveling::with_config(dir, config)
    }

    fn generator(site: &Spacetraveling, posts: Vec<PostDetail>) -> Generator {
        Generator::new(site, Arc::new(InMemoryGateway::new(posts))).unwrap()
    }

    #[tokio::test]
    async fn test_generate_writes_listing_and_posts() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 2);
        let generator = generator(&site, vec![post("jan", 1), post("feb", 2), post("mar", 3)]);

        let stats = generator.generate().await.unwrap();
        assert_eq!(
            stats,
            GenerateStats {
                index_pages: 2,
                posts: 3,
                skipped: 0
            }
        );

        let index = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(index.contains(r#"href="/post/jan/""#));
        assert!(index.contains(r#"href="/post/feb/""#));
        assert!(!index.contains(r#"href="/post/mar/""#));
        assert!(index.contains(r#"<a class="load-more" href="/page/2/">"#));
        assert!(index.contains("15 Jan 2021"));
        assert!(index.contains(r#"<link rel="canonical" href="http://example.com/">"#));

        let page2 = fs::read_to_string(site.public_dir.join("page/2/index.html")).unwrap();
        assert!(page2.contains(r#"<link rel="canonical" href="http://example.com/page/2/">"#));
        assert!(page2.contains(r#"href="/post/jan/""#));
        assert!(page2.contains(r#"href="/post/mar/""#));
        assert!(!page2.contains("load-more"));

        assert!(site.public_dir.join("post/feb/index.html").exists());
        assert!(site.public_dir.join("404.html").exists());
        assert!(site.public_dir.join("css/style.css").exists());
    }

    #[tokio::test]
    async fn test_post_page_content() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 20);
        let generator = generator(&site, vec![post("jan", 1), post("feb", 2), post("mar", 3)]);

        let page = generator.resolve_post("feb").await.unwrap();
        let html = generator.render_post_page(&page).unwrap();
        assert!(html.contains("<h1>Post &lt;feb&gt;</h1>"));
        assert!(html.contains("<p>Hello <strong>world</strong></p>"));
        assert!(html.contains("3 min"));
        assert!(html.contains(r#"<link rel="canonical" href="http://example.com/post/feb/">"#));
        assert!(html.contains(r#"<a class="prev" href="/post/jan/">"#));
        assert!(html.contains(r#"<a class="next" href="/post/mar/">"#));
        assert!(!html.contains("class=\"updated\""));
    }

    #[tokio::test]
    async fn test_edge_posts_have_one_neighbour() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 20);
        let generator = generator(&site, vec![post("jan", 1), post("feb", 2)]);

        let html = generator
            .render_post_page(&generator.resolve_post("jan").await.unwrap())
            .unwrap();
        assert!(!html.contains(r#"class="prev""#));
        assert!(html.contains(r#"<a class="next" href="/post/feb/">"#));
    }

    #[tokio::test]
    async fn test_edited_post_shows_update_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 20);
        let mut edited = post("jan", 1);
        edited.updated_at = Some(Utc.with_ymd_and_hms(2021, 3, 19, 8, 5, 0).unwrap());
        let generator = generator(&site, vec![edited]);

        let html = generator
            .render_post_page(&generator.resolve_post("jan").await.unwrap())
            .unwrap();
        assert!(html.contains("* edited on 19 Mar 2021, at 08:05"));
    }

    #[tokio::test]
    async fn test_missing_and_loading_pages() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 20);
        let generator = generator(&site, vec![post("jan", 1)]);

        let missing = generator.resolve_post("nope").await.unwrap();
        assert_eq!(missing, PostPage::NotFound);
        assert!(generator
            .render_post_page(&missing)
            .unwrap()
            .contains("Post not found"));
        assert!(!generator.generate_post("nope").await.unwrap());

        let loading = generator.render_post_page(&PostPage::Loading).unwrap();
        assert!(loading.contains("Loading..."));
        assert!(loading.contains(r#"http-equiv="refresh""#));
    }

    #[tokio::test]
    async fn test_static_dir_overrides_theme_assets() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 20);
        fs::create_dir_all(site.static_dir.join("images")).unwrap();
        fs::write(site.static_dir.join("images/logo.svg"), "<svg>custom</svg>").unwrap();
        let generator = generator(&site, vec![post("jan", 1)]);

        generator.generate().await.unwrap();
        let logo = fs::read_to_string(site.public_dir.join("images/logo.svg")).unwrap();
        assert_eq!(logo, "<svg>custom</svg>");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 20);
        let generator = generator(&site, Vec::new());

        let stats = generator.generate().await.unwrap();
        assert_eq!(stats.index_pages, 1);
        assert_eq!(stats.posts, 0);
        let index = fs::read_to_string(site.public_dir.join("index.html")).unwrap();
        assert!(!index.contains("load-more"));
    }
}
