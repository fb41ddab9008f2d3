//! Page Assembler
//!
//! Per-route orchestration: fetch the page and its auxiliary content
//! concurrently, render the dynamic zone, project the metadata.
//!
//! Every failure ends in a renderable outcome. An absent page and an
//! unreachable CMS both become [`PageOutcome::NotFound`]; the upstream error
//! is logged with the slug, never shown to the visitor.

use std::sync::Arc;

use crate::contact::validation::ContactFormSchema;
use crate::content::{canonical_for, page_metadata, ContentError, ContentSource, FaqCategory, FaqItem, Page, PageMetadata, SiteConfig};
use crate::sections::faq_list::format_item;
use crate::sections::{RenderContext, RenderedSection, SectionRegistry, SectionRenderer};

/// CMS slug of the FAQ landing page.
pub const FAQ_SLUG: &str = "faq";

#[derive(Debug, Clone)]
pub struct AssembledPage {
    pub slug: String,
    pub title: String,
    pub metadata: PageMetadata,
    pub sections: Vec<RenderedSection>,
    pub site: SiteConfig,
    /// Only populated on the FAQ page
    pub faq: Vec<FaqGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqGroup {
    pub name: String,
    pub slug: String,
    /// Pre-rendered `<details>` blocks
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum PageOutcome {
    Found(Box<AssembledPage>),
    /// Site config is carried along so the 404 page keeps its navigation
    NotFound { site: SiteConfig },
}

pub struct PageAssembler {
    content: Arc<dyn ContentSource>,
    registry: Arc<SectionRegistry>,
    /// Request-independent render inputs (media base, form action, CAPTCHA widget)
    base_context: RenderContext,
    site_url: String,
}

impl PageAssembler {
    pub fn new(
        content: Arc<dyn ContentSource>,
        registry: Arc<SectionRegistry>,
        base_context: RenderContext,
        site_url: &str,
    ) -> Self {
        Self {
            content,
            registry,
            base_context,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Assemble a generic content page.
    #[tracing::instrument(skip(self))]
    pub async fn assemble(&self, slug: &str) -> PageOutcome {
        let (page, site) = tokio::join!(self.content.get_page(slug), self.content.get_site_config());
        let site = site_or_default(site);

        match found_page(page) {
            Some(page) => PageOutcome::Found(Box::new(self.build(page, site, Vec::new()))),
            None => PageOutcome::NotFound { site },
        }
    }

    /// Assemble the FAQ page: page body, categories and items fetched together.
    #[tracing::instrument(skip(self))]
    pub async fn assemble_faq(&self) -> PageOutcome {
        self.faq_outcome(None).await
    }

    /// The FAQ page narrowed to one category. Unknown categories are not found.
    #[tracing::instrument(skip(self))]
    pub async fn assemble_faq_category(&self, category: &str) -> PageOutcome {
        self.faq_outcome(Some(category)).await
    }

    async fn faq_outcome(&self, category: Option<&str>) -> PageOutcome {
        let (page, site, categories, items) = tokio::join!(
            self.content.get_page(FAQ_SLUG),
            self.content.get_site_config(),
            self.content.get_faq_categories(),
            self.content.get_faq_items(category),
        );
        let site = site_or_default(site);

        let page = match found_page(page) {
            Some(page) => page,
            None => return PageOutcome::NotFound { site },
        };

        // Auxiliary lists degrade to empty rather than failing the page
        let categories = categories.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch FAQ categories");
            Vec::new()
        });
        let items = items.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch FAQ items");
            Vec::new()
        });

        let Some(slug) = category else {
            let groups = group_faqs(&categories, &items);
            return PageOutcome::Found(Box::new(self.build(page, site, groups)));
        };

        let Some(selected) = categories.iter().find(|c| c.slug == slug) else {
            tracing::info!("FAQ category not found in CMS");
            return PageOutcome::NotFound { site };
        };

        let groups: Vec<FaqGroup> = group_faqs(std::slice::from_ref(selected), &items)
            .into_iter()
            .filter(|group| group.slug == slug)
            .collect();

        let mut assembled = self.build(page, site, groups);
        assembled.metadata.title = format!("{} | {}", selected.name, assembled.metadata.title);
        assembled.metadata.og_title = assembled.metadata.title.clone();
        assembled.metadata.canonical = format!("{}/{}", canonical_for(&self.site_url, FAQ_SLUG), urlencoding::encode(slug));
        PageOutcome::Found(Box::new(assembled))
    }

    /// Site configuration for routes that have no page record (404, theme).
    pub async fn site(&self) -> SiteConfig {
        site_or_default(self.content.get_site_config().await)
    }

    /// Render inputs for one request: the shared base plus the site's form overrides.
    pub fn context_for(&self, site: &SiteConfig) -> RenderContext {
        let mut context = self.base_context.clone();
        context.contact_form = match &site.contact_form {
            Some(settings) => ContactFormSchema::with_overrides(&settings.fields),
            None => ContactFormSchema::default(),
        };
        context
    }

    fn build(&self, page: Page, site: SiteConfig, faq: Vec<FaqGroup>) -> AssembledPage {
        let context = self.context_for(&site);
        let sections = SectionRenderer::new(&self.registry, &context).render(&page.sections);
        let metadata = page_metadata(&page, &site, &self.site_url, &context.media_base);

        tracing::debug!(
            "Assembled page {} ({} sections, {} placeholders)",
            page.slug,
            sections.len(),
            sections.iter().filter(|s| s.is_placeholder()).count()
        );

        AssembledPage {
            slug: page.slug,
            title: page.title,
            metadata,
            sections,
            site,
            faq,
        }
    }
}

/// Absent and unreachable both mean "no page"; only the latter is an error.
fn found_page(page: Result<Option<Page>, ContentError>) -> Option<Page> {
    match page {
        Ok(Some(page)) => Some(page),
        Ok(None) => {
            tracing::info!("Page not found in CMS");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch page, serving not-found");
            None
        }
    }
}

fn site_or_default(site: Result<Option<SiteConfig>, ContentError>) -> SiteConfig {
    match site {
        Ok(Some(site)) => site,
        Ok(None) => SiteConfig::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Site config unavailable, using defaults");
            SiteConfig::default()
        }
    }
}

/// Group items under their categories, in category order. Items without a
/// known category go to a trailing "General" group; empty groups are dropped.
pub fn group_faqs(categories: &[FaqCategory], items: &[FaqItem]) -> Vec<FaqGroup> {
    let render = |item: &FaqItem| format_item(&item.question, &item.answer);

    let mut groups: Vec<FaqGroup> = categories
        .iter()
        .map(|category| FaqGroup {
            name: category.name.clone(),
            slug: category.slug.clone(),
            items: items
                .iter()
                .filter(|item| item.category_slug() == Some(category.slug.as_str()))
                .map(render)
                .collect(),
        })
        .filter(|group| !group.items.is_empty())
        .collect();

    let uncategorized: Vec<String> = items
        .iter()
        .filter(|item| {
            item.category_slug()
                .map(|slug| !categories.iter().any(|c| c.slug == slug))
                .unwrap_or(true)
        })
        .map(render)
        .collect();

    if !uncategorized.is_empty() {
        groups.push(FaqGroup {
            name: "General".to_string(),
            slug: "general".to_string(),
            items: uncategorized,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::CmsClient;
    use serde_json::json;
    use std::time::Duration;

    fn item(question: &str, category: Option<&str>) -> FaqItem {
        FaqItem {
            question: question.to_string(),
            answer: "Answer".to_string(),
            category: category.map(|slug| json!({ "slug": slug })),
            ..Default::default()
        }
    }

    fn category(name: &str, slug: &str) -> FaqCategory {
        FaqCategory {
            name: name.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_faqs() {
        let categories = vec![category("Process", "process"), category("Billing", "billing"), category("Empty", "empty")];
        let items = vec![
            item("How long does it take?", Some("process")),
            item("Orphan?", Some("retired-category")),
            item("What does it cost?", Some("billing")),
            item("No category?", None),
            item("Who reviews my case?", Some("process")),
        ];

        let groups = group_faqs(&categories, &items);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Process", "Billing", "General"]);
        assert_eq!(groups[0].items.len(), 2);
        assert!(groups[0].items[0].contains("How long does it take?"));
        assert_eq!(groups[2].items.len(), 2);
    }

    #[test]
    fn test_group_faqs_empty() {
        assert!(group_faqs(&[], &[]).is_empty());
    }

    #[tokio::test]
    async fn test_network_error_degrades_to_not_found() {
        // Nothing listens on the discard port, so every request fails to connect
        let client = CmsClient::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
        let assembler = PageAssembler::new(
            Arc::new(client),
            Arc::new(SectionRegistry::with_defaults()),
            RenderContext::default(),
            "http://localhost:3000/",
        );

        match assembler.assemble("about").await {
            PageOutcome::NotFound { site } => assert_eq!(site, SiteConfig::default()),
            PageOutcome::Found(page) => panic!("expected not-found, got {}", page.slug),
        }
        assert_eq!(assembler.site_url(), "http://localhost:3000");
    }
}
