//! Built-in Spacetraveling templates using the Tera template engine
//!
//! Templates and static assets are embedded in the binary. Autoescaping is
//! off: text coming from the content API is escaped when the template data
//! is built, and section bodies are already HTML.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::Section;

/// Assets written to the output directory as-is
pub const ASSETS: &[(&str, &str)] = &[
    ("css/style.css", include_str!("spacetraveling/assets/style.css")),
    ("images/logo.svg", include_str!("spacetraveling/assets/logo.svg")),
    ("images/calendar.svg", include_str!("spacetraveling/assets/calendar.svg")),
    ("images/user.svg", include_str!("spacetraveling/assets/user.svg")),
    ("images/clock.svg", include_str!("spacetraveling/assets/clock.svg")),
];

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("loading.html", include_str!("spacetraveling/loading.html")),
            ("not_found.html", include_str!("spacetraveling/not_found.html")),
            ("error.html", include_str!("spacetraveling/error.html")),
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(crate::helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub version: String,
    pub labels: LabelsData,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelsData {
    pub load_more: String,
    pub loading: String,
    pub updated: String,
    pub previous: String,
    pub next: String,
    pub not_found: String,
    pub reading_time: String,
}

/// A listing entry
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
    pub url: String,
}

/// A full post
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailData {
    pub title: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
    /// Set only when the post was edited after publication
    pub updated: Option<String>,
    pub banner_url: String,
    pub description: String,
    pub reading_time: usize,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    /// Empty on the last page
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}
