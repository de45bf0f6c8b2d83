//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Create `_config.yml` and the static directory in `target_dir`
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("static/images"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, leaving it as is", config_path);
        return Ok(());
    }

    let config_content = r#"# Spacetraveling configuration

# Site
title: Spacetraveling
description: ''
locale: en_US
timezone: UTC

# URL
url: http://example.com
root: /

# Directory
public_dir: public
static_dir: static

# Date / Time format (date-fns tokens)
date_format: dd MMM yyyy
updated_format: "dd MMM yyyy, 'at' HH:mm"
words_per_minute: 200

labels:
  load_more: Load more posts
  loading: Loading...
  updated: '* edited on'
  previous: Previous post
  next: Next post
  not_found: Post not found
  reading_time: min

# Content API
# The access token may also be given with PRISMIC_ACCESS_TOKEN
prismic:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  document_type: post
  page_size: 20
  # blocking | loading
  fallback: blocking
"#;

    fs::write(&config_path, config_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("static/images").is_dir());
        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.title, "Spacetraveling");
        assert_eq!(config.prismic.page_size.get(), 20);
        assert_eq!(config.updated_format, "dd MMM yyyy, 'at' HH:mm");
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();
        let content = fs::read_to_string(dir.path().join("_config.yml")).unwrap();
        assert_eq!(content, "title: Mine\n");
    }
}
