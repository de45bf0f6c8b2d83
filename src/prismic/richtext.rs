//! Rich text to HTML
//!
//! Renders the structured body format of the content API the same way the
//! vendor's `asHtml` does: one element per block, consecutive list items
//! grouped into a single list, inline spans turned into nested tags.

use super::api::{RichTextBlock, Span};
use crate::helpers::html_escape;

/// Render a rich-text field to HTML
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

/// Plain text of a rich-text field, one line per block
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &RichTextBlock) -> String {
    let class = block
        .label
        .as_ref()
        .map(|l| format!(r#" class="{}""#, html_escape(l)))
        .unwrap_or_default();

    let tag = match block.kind.as_str() {
        "paragraph" => "p",
        "heading1" => "h1",
        "heading2" => "h2",
        "heading3" => "h3",
        "heading4" => "h4",
        "heading5" => "h5",
        "heading6" => "h6",
        "preformatted" => "pre",
        "list-item" | "o-list-item" => "li",
        "image" => return render_image(block),
        "embed" => return render_embed(block),
        other => {
            tracing::debug!("Skipping unsupported rich text block: {}", other);
            return String::new();
        }
    };

    format!(
        "<{tag}{class}>{}</{tag}>",
        render_spans(&block.text, &block.spans)
    )
}

fn render_image(block: &RichTextBlock) -> String {
    let url = block.url.as_deref().unwrap_or("");
    let alt = block.alt.as_deref().unwrap_or("");
    format!(
        r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
        html_escape(url),
        html_escape(alt)
    )
}

fn render_embed(block: &RichTextBlock) -> String {
    let Some(oembed) = &block.oembed else {
        return String::new();
    };
    format!(
        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
        html_escape(oembed_field(oembed, "embed_url")),
        html_escape(oembed_field(oembed, "type")),
        html_escape(oembed_field(oembed, "provider_name")),
        oembed_field(oembed, "html")
    )
}

fn oembed_field<'a>(oembed: &'a serde_json::Value, name: &str) -> &'a str {
    oembed.get(name).and_then(|v| v.as_str()).unwrap_or("")
}

/// Apply spans to a block's text
///
/// Offsets count characters. Spans that overlap without nesting are
/// closed and reopened so the output stays well-formed.
fn render_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut ordered: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len)
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let end_of = |s: &Span| s.end.min(len);
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<&Span> = Vec::new();
    let mut next = 0;

    for i in 0..=len {
        if stack.iter().any(|s| end_of(*s) <= i) {
            let mut reopen = Vec::new();
            while stack.iter().any(|s| end_of(*s) <= i) {
                let Some(top) = stack.pop() else { break };
                out.push_str(&close_tag(top));
                if end_of(top) > i {
                    reopen.push(top);
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&open_tag(span));
                stack.push(span);
            }
        }

        if i == len {
            break;
        }

        while next < ordered.len() && ordered[next].start == i {
            out.push_str(&open_tag(ordered[next]));
            stack.push(ordered[next]);
            next += 1;
        }

        match chars[i] {
            '\n' => out.push_str("<br />"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }

    out
}

fn span_data<'a>(span: &'a Span, key: &str) -> Option<&'a str> {
    span.data.as_ref()?.get(key)?.as_str()
}

fn open_tag(span: &Span) -> String {
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let href = span_data(span, "url").unwrap_or("");
            match span_data(span, "target") {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    html_escape(href),
                    html_escape(target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(href)),
            }
        }
        "label" => format!(
            r#"<span class="{}">"#,
            html_escape(span_data(span, "label").unwrap_or(""))
        ),
        _ => String::new(),
    }
}

fn close_tag(span: &Span) -> String {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        "label" => "</span>",
        _ => "",
    }
    .to_string()
}
