// Page handlers for HTML rendering with Askama

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Datelike;

use crate::assembler::{AssembledPage, FaqGroup, PageOutcome};
use crate::content::{PageMetadata, SiteConfig, HOME_SLUG};
use crate::error::AppError;
use crate::sections::html::safe_href;
use crate::web::AppState;

// ============================================================================
// Shared envelope
// ============================================================================

/// Header navigation and footer, from site config.
pub struct LayoutView {
    pub site_name: String,
    pub tagline: String,
    pub nav: Vec<NavItem>,
    pub footer_text: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub year: i32,
}

pub struct NavItem {
    pub label: String,
    pub href: String,
}

/// `<head>` values; empty strings are omitted by the template.
pub struct HeadView {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub twitter_card: String,
    pub canonical: String,
    pub robots: String,
}

impl LayoutView {
    pub fn from_site(site: &SiteConfig) -> Self {
        let nav = site
            .navigation
            .iter()
            .filter_map(|link| {
                safe_href(&link.url).map(|href| NavItem {
                    label: link.label.clone(),
                    href: href.to_string(),
                })
            })
            .collect();

        Self {
            site_name: site.site_name.clone(),
            tagline: site.tagline.clone().unwrap_or_default(),
            nav,
            footer_text: site.footer_text.clone().unwrap_or_default(),
            contact_email: site.contact_email.clone().unwrap_or_default(),
            contact_phone: site.contact_phone.clone().unwrap_or_default(),
            year: chrono::Utc::now().year(),
        }
    }
}

impl From<&PageMetadata> for HeadView {
    fn from(meta: &PageMetadata) -> Self {
        Self {
            title: meta.title.clone(),
            description: meta.description.clone(),
            keywords: meta.keywords.clone().unwrap_or_default(),
            og_title: meta.og_title.clone(),
            og_description: meta.og_description.clone(),
            og_image: meta.og_image.clone().unwrap_or_default(),
            twitter_card: meta.twitter_card.to_string(),
            canonical: meta.canonical.clone(),
            robots: meta.robots(),
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Template)]
#[template(path = "pages/page.html")]
pub struct PageTemplate {
    pub layout: LayoutView,
    pub head: HeadView,
    pub slug: String,
    pub sections: Vec<String>,
}

#[derive(Template)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub layout: LayoutView,
    pub head: HeadView,
    pub title: String,
    pub sections: Vec<String>,
    pub groups: Vec<FaqGroup>,
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub layout: LayoutView,
    pub head: HeadView,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn home_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let outcome = state.assembler.assemble(HOME_SLUG).await;
    render_outcome(&state, outcome)
}

pub async fn content_page(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response, AppError> {
    // The home page has exactly one URL
    if slug == HOME_SLUG {
        return Ok(Redirect::permanent("/").into_response());
    }
    // Never ask the CMS for something that cannot be a slug (favicon.ico, probes)
    if !is_valid_slug(&slug) {
        let site = state.assembler.site().await;
        return render_not_found(&state, &site);
    }

    let outcome = state.assembler.assemble(&slug).await;
    render_outcome(&state, outcome)
}

pub async fn faq_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let outcome = state.assembler.assemble_faq().await;
    render_faq(&state, outcome)
}

pub async fn faq_category_page(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Response, AppError> {
    if !is_valid_slug(&category) {
        let site = state.assembler.site().await;
        return render_not_found(&state, &site);
    }
    let outcome = state.assembler.assemble_faq_category(&category).await;
    render_faq(&state, outcome)
}

/// Router fallback: every unmatched path gets the themed 404 page.
pub async fn not_found_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let site = state.assembler.site().await;
    render_not_found(&state, &site)
}

fn render_outcome(state: &AppState, outcome: PageOutcome) -> Result<Response, AppError> {
    match outcome {
        PageOutcome::Found(page) => render_page(*page),
        PageOutcome::NotFound { site } => render_not_found(state, &site),
    }
}

fn render_faq(state: &AppState, outcome: PageOutcome) -> Result<Response, AppError> {
    match outcome {
        PageOutcome::Found(page) => {
            let page = *page;
            let template = FaqTemplate {
                layout: LayoutView::from_site(&page.site),
                head: HeadView::from(&page.metadata),
                title: page.title,
                sections: page.sections.iter().map(|s| s.to_html()).collect(),
                groups: page.faq,
            };
            Ok(Html(template.render()?).into_response())
        }
        PageOutcome::NotFound { site } => render_not_found(state, &site),
    }
}

fn render_page(page: AssembledPage) -> Result<Response, AppError> {
    let template = PageTemplate {
        layout: LayoutView::from_site(&page.site),
        head: HeadView::from(&page.metadata),
        sections: page.sections.iter().map(|s| s.to_html()).collect(),
        slug: page.slug,
    };
    Ok(Html(template.render()?).into_response())
}

fn render_not_found(state: &AppState, site: &SiteConfig) -> Result<Response, AppError> {
    let metadata = PageMetadata::not_found(site, state.assembler.site_url());
    let template = NotFoundTemplate {
        layout: LayoutView::from_site(site),
        head: HeadView::from(&metadata),
    };
    Ok((StatusCode::NOT_FOUND, Html(template.render()?)).into_response())
}

/// Lowercase letters, digits and single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 200
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
