//! Helper functions for templates
//!
//! Date formatting, URL generation and HTML escaping shared by the
//! generator, the templates and the preview server.

mod date;
mod html;
mod url;

use anyhow::Result;
use chrono::{DateTime, Utc};

pub use date::*;
pub use html::*;
pub use url::*;

use crate::config::SiteConfig;

/// Collection of helpers bound to one site configuration
#[derive(Clone)]
pub struct Helpers {
    config: SiteConfig,
    locale: chrono::Locale,
    tz: chrono_tz::Tz,
}

impl Helpers {
    /// Create a new helpers instance
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            locale: config.chrono_locale()?,
            tz: config.chrono_tz()?,
        })
    }

    /// Get url_for helper
    pub fn url_for(&self, path: &str) -> String {
        url_for(&self.config, path)
    }

    /// Get full_url_for helper
    pub fn full_url_for(&self, path: &str) -> String {
        full_url_for(&self.config, path)
    }

    /// Rooted URL of a post page
    pub fn post_url(&self, uid: &str) -> String {
        self.url_for(&post_path(uid))
    }

    /// Format a publication date with `date_format`
    pub fn date(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.config.date_format, self.locale, self.tz)
    }

    /// Format an edit date with `updated_format`
    pub fn updated_date(&self, date: &DateTime<Utc>) -> String {
        format_date(date, &self.config.updated_format, self.locale, self.tz)
    }
}
