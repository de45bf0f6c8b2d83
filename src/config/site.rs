//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

/// Environment variable that overrides `prismic.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub locale: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Date / Time format (date-fns style tokens)
    pub date_format: String,
    pub updated_format: String,

    // Reading time
    pub words_per_minute: u32,

    #[serde(default)]
    pub labels: LabelsConfig,

    #[serde(default)]
    pub prismic: PrismicConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Spacetraveling".to_string(),
            description: String::new(),
            locale: "en_US".to_string(),
            timezone: "UTC".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            date_format: "dd MMM yyyy".to_string(),
            updated_format: "dd MMM yyyy, 'at' HH:mm".to_string(),

            words_per_minute: 200,

            labels: LabelsConfig::default(),
            prismic: PrismicConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be validated by serde alone
    pub fn validate(&self) -> Result<()> {
        self.chrono_locale()?;
        self.chrono_tz()?;
        if self.words_per_minute == 0 {
            anyhow::bail!("words_per_minute must be greater than zero");
        }
        Ok(())
    }

    /// Resolve the configured locale
    pub fn chrono_locale(&self) -> Result<chrono::Locale> {
        chrono::Locale::try_from(self.locale.as_str())
            .map_err(|_| anyhow::anyhow!("Unknown locale: {}", self.locale))
    }

    /// Resolve the configured time zone
    pub fn chrono_tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("Unknown timezone {}: {}", self.timezone, e))
    }

    /// Apply overrides taken from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
                self.prismic.access_token = Some(token);
            }
        }
    }
}

/// User-facing strings rendered by the templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub load_more: String,
    pub loading: String,
    pub updated: String,
    pub previous: String,
    pub next: String,
    pub not_found: String,
    pub reading_time: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            load_more: "Load more posts".to_string(),
            loading: "Loading...".to_string(),
            updated: "* edited on".to_string(),
            previous: "Previous post".to_string(),
            next: "Next post".to_string(),
            not_found: "Post not found".to_string(),
            reading_time: "min".to_string(),
        }
    }
}

/// How the preview server answers for posts that were not generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Render within the request
    #[default]
    Blocking,
    /// Answer with the loading placeholder and render in the background
    Loading,
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: NonZeroU32,
    pub fallback: FallbackMode,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "post".to_string(),
            page_size: NonZeroU32::new(20).unwrap_or(NonZeroU32::MIN),
            fallback: FallbackMode::Blocking,
        }
    }
}
