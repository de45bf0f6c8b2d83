//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Spacetraveling;

/// Fetch everything from the content API and write the site
pub async fn run(site: &Spacetraveling) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site, site.gateway()?)?;
    let stats = generator.generate().await?;

    if stats.skipped > 0 {
        tracing::warn!("{} posts were listed but could not be fetched", stats.skipped);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} index pages and {} posts in {:.2}s",
        stats.index_pages,
        stats.posts,
        duration.as_secs_f64()
    );

    Ok(())
}
