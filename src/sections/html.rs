//! HTML building helpers shared by the section renderers.
//!
//! Every CMS string reaching the page goes through [`escape`] or [`markdown`];
//! URLs go through [`safe_href`] or [`media`].

use askama::{Html, MarkupDisplay};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use serde_json::{Map, Value};

/// Escape text for use in element content and quoted attributes, with the
/// same escaper the Askama templates apply.
pub fn escape(text: &str) -> String {
    MarkupDisplay::new_unsafe(text, Html).to_string()
}

/// Render CMS rich text (Markdown) to HTML.
///
/// Raw HTML in the source is emitted as escaped text and unsafe link targets
/// are neutralised.
pub fn markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralise(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralise(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut out, parser);
    out
}

fn neutralise(url: CowStr<'_>) -> CowStr<'_> {
    if safe_href(&url).is_some() {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Accept only link targets that cannot execute script.
pub fn safe_href(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let allowed = ["https://", "http://", "mailto:", "tel:", "/", "#"]
        .iter()
        .any(|prefix| lower.starts_with(prefix));
    allowed.then_some(url)
}

// ============================================================================
// Field access
// ============================================================================

/// Trimmed, non-empty string field.
pub fn text<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Object entries of an array field. Non-object entries are skipped.
pub fn items<'a>(fields: &'a Map<String, Value>, key: &str) -> Vec<&'a Map<String, Value>> {
    fields
        .get(key)
        .and_then(|v| v.as_array())
        .map(|entries| entries.iter().filter_map(|e| e.as_object()).collect())
        .unwrap_or_default()
}

/// Pick `value` if it is one of `allowed`, otherwise `default`. Used for CSS modifiers.
pub fn variant<'a>(fields: &'a Map<String, Value>, key: &str, allowed: &[&'a str], default: &'a str) -> &'a str {
    text(fields, key)
        .and_then(|v| allowed.iter().copied().find(|a| *a == v))
        .unwrap_or(default)
}

// ============================================================================
// Media
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    pub alt: String,
}

/// Resolve a CMS media relation (v4 `{data: {attributes}}`, v5 flat, or a bare URL).
///
/// Relative upload paths are prefixed with `base`.
pub fn media(value: &Value, base: &str) -> Option<Media> {
    let entry = value.get("data").unwrap_or(value);
    let entry = match entry {
        Value::Array(entries) => entries.first()?,
        other => other,
    };
    let entry = entry.get("attributes").unwrap_or(entry);

    let raw_url = match entry {
        Value::String(url) => url.as_str(),
        _ => entry.get("url")?.as_str()?,
    };

    let url = if raw_url.starts_with("https://") || raw_url.starts_with("http://") {
        raw_url.to_string()
    } else if raw_url.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), raw_url)
    } else {
        return None;
    };

    let alt = entry
        .get("alternativeText")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Some(Media { url, alt })
}

/// `<img>` tag for a media field, lazy loaded.
pub fn image_tag(fields: &Map<String, Value>, key: &str, base: &str, class: &str) -> Option<String> {
    let media = media(fields.get(key)?, base)?;
    Some(format!(
        "<img class=\"{}\" src=\"{}\" alt=\"{}\" loading=\"lazy\" decoding=\"async\">",
        class,
        escape(&media.url),
        escape(&media.alt)
    ))
}

/// Call-to-action link from a label/url field pair.
pub fn button(fields: &Map<String, Value>, label_key: &str, url_key: &str, class: &str) -> Option<String> {
    let label = text(fields, label_key)?;
    let href = text(fields, url_key).and_then(safe_href)?;
    Some(format!(
        "<a class=\"{}\" href=\"{}\">{}</a>",
        class,
        escape(href),
        escape(label)
    ))
}
