//! Page Metadata Projection
//!
//! One shared projection from (page, site config) to the head-tag metadata
//! every route emits: title, description, Open Graph, Twitter card, canonical
//! URL and robots directives.

use serde::Serialize;

use crate::content::types::{Page, SiteConfig};
use crate::sections::html::media;

/// Slug served at the site root.
pub const HOME_SLUG: &str = "home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Option<String>,
    pub og_title: String,
    pub og_description: String,
    pub og_image: Option<String>,
    pub twitter_card: &'static str,
    pub canonical: String,
    pub noindex: bool,
    pub nofollow: bool,
}

impl PageMetadata {
    /// Value for `<meta name="robots">`.
    pub fn robots(&self) -> String {
        let index = if self.noindex { "noindex" } else { "index" };
        let follow = if self.nofollow { "nofollow" } else { "follow" };
        format!("{}, {}", index, follow)
    }

    /// Metadata for the not-found page: never indexed.
    pub fn not_found(site: &SiteConfig, site_url: &str) -> Self {
        let title = with_site_name("Page not found", &site.site_name);
        let description = site.default_description.clone().unwrap_or_default();
        Self {
            og_title: title.clone(),
            og_description: description.clone(),
            title,
            description,
            keywords: None,
            og_image: None,
            twitter_card: "summary",
            canonical: site_url.trim_end_matches('/').to_string(),
            noindex: true,
            nofollow: true,
        }
    }
}

/// Project a page and the site configuration into head metadata.
///
/// `media_base` prefixes relative upload URLs (the CMS serves `/uploads/...`).
pub fn page_metadata(page: &Page, site: &SiteConfig, site_url: &str, media_base: &str) -> PageMetadata {
    let seo = page.seo.clone().unwrap_or_default();

    let base_title = non_empty(seo.meta_title.as_deref())
        .or_else(|| non_empty(Some(page.title.as_str())))
        .unwrap_or(site.site_name.as_str());
    let title = with_site_name(base_title, &site.site_name);

    let description = non_empty(seo.meta_description.as_deref())
        .or_else(|| non_empty(page.description.as_deref()))
        .or_else(|| non_empty(site.default_description.as_deref()))
        .unwrap_or_default()
        .to_string();

    let og_image = seo
        .meta_image
        .as_ref()
        .and_then(|m| media(m, media_base))
        .or_else(|| site.default_share_image.as_ref().and_then(|m| media(m, media_base)))
        .map(|m| m.url);

    let canonical = match non_empty(seo.canonical_url.as_deref()) {
        Some(url) => url.to_string(),
        None => canonical_for(site_url, &page.slug),
    };

    PageMetadata {
        og_title: title.clone(),
        og_description: description.clone(),
        title,
        description,
        keywords: non_empty(seo.keywords.as_deref()).map(str::to_string),
        twitter_card: if og_image.is_some() { "summary_large_image" } else { "summary" },
        og_image,
        canonical,
        noindex: seo.noindex,
        nofollow: seo.nofollow,
    }
}

/// Canonical URL for a slug. The home slug maps to the site root.
pub fn canonical_for(site_url: &str, slug: &str) -> String {
    let root = site_url.trim_end_matches('/');
    if slug.is_empty() || slug == HOME_SLUG {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, urlencoding::encode(slug))
    }
}

fn with_site_name(title: &str, site_name: &str) -> String {
    if site_name.is_empty() || title.contains(site_name) {
        title.to_string()
    } else {
        format!("{} | {}", title, site_name)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
