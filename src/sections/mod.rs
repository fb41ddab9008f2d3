//! Dynamic-Zone Section Rendering
//!
//! Turns a page's CMS-ordered, heterogeneous section list into HTML.
//!
//! ## Pipeline
//! 1. Drop entries failing the record invariant (object, non-empty
//!    `__component`, positive integer `id`), logging each drop
//! 2. Resolve each remaining tag through the [`SectionRegistry`], in input order
//! 3. Registered: render the record's fields. Unregistered: emit a visible
//!    placeholder in the same position
//!
//! Rendering is a pure, synchronous pass. New CMS section types degrade to a
//! placeholder; they never fail the page.
//!
//! ## Sections
//! hero, rich-text, cta, feature-grid, process-steps, faq-list,
//! testimonials, stats, image-text, contact-form

pub mod html;
pub mod registry;

pub mod contact_form;
pub mod cta;
pub mod faq_list;
pub mod feature_grid;
pub mod hero;
pub mod image_text;
pub mod process_steps;
pub mod rich_text;
pub mod stats;
pub mod testimonials;

pub use registry::{RenderFn, SectionRegistry, DEFAULT_RENDERERS};

use serde_json::Value;

use crate::contact::validation::ContactFormSchema;
use crate::content::types::SectionRecord;
use html::escape;

/// Read-only inputs shared by every renderer on a page.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Prefix for relative CMS upload URLs
    pub media_base: String,
    /// Where the contact form posts (htmx-enhanced form route)
    pub contact_action: String,
    pub captcha: Option<CaptchaWidget>,
    /// Contact form fields, with CMS overrides applied
    pub contact_form: ContactFormSchema,
}

/// Public half of the CAPTCHA configuration, as needed by the form markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaWidget {
    pub script_url: String,
    pub widget_class: String,
    pub site_key: String,
}

/// One output slot, in the same position as its input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedSection {
    Rendered { id: u64, component: String, html: String },
    Placeholder { id: u64, component: String },
}

impl RenderedSection {
    pub fn id(&self) -> u64 {
        match self {
            RenderedSection::Rendered { id, .. } | RenderedSection::Placeholder { id, .. } => *id,
        }
    }

    pub fn component(&self) -> &str {
        match self {
            RenderedSection::Rendered { component, .. } | RenderedSection::Placeholder { component, .. } => component,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderedSection::Placeholder { .. })
    }

    pub fn to_html(&self) -> String {
        match self {
            RenderedSection::Rendered { html, .. } => html.clone(),
            RenderedSection::Placeholder { id, component } => format!(
                "<div class=\"section-placeholder\" role=\"note\" data-section-id=\"{}\">\
                 <p>Unsupported content block: <code>{}</code></p></div>",
                id,
                escape(component)
            ),
        }
    }
}

pub struct SectionRenderer<'a> {
    registry: &'a SectionRegistry,
    context: &'a RenderContext,
}

impl<'a> SectionRenderer<'a> {
    pub fn new(registry: &'a SectionRegistry, context: &'a RenderContext) -> Self {
        Self { registry, context }
    }

    /// Render a raw dynamic zone. Output order follows input order.
    pub fn render(&self, sections: &[Value]) -> Vec<RenderedSection> {
        valid_sections(sections)
            .into_iter()
            .map(|record| self.render_record(record))
            .collect()
    }

    fn render_record(&self, record: SectionRecord) -> RenderedSection {
        match self.registry.resolve(&record.component) {
            Some(render) => {
                let inner = render(&record.fields, self.context);
                RenderedSection::Rendered {
                    id: record.id,
                    html: wrap(record.id, &record.component, &inner),
                    component: record.component,
                }
            }
            None => {
                tracing::warn!(
                    section_id = record.id,
                    component = %record.component,
                    "No renderer registered for section type"
                );
                RenderedSection::Placeholder {
                    id: record.id,
                    component: record.component,
                }
            }
        }
    }
}

/// The shared validity filter used by every route. Invalid entries are
/// dropped and logged with the offending record.
pub fn valid_sections(sections: &[Value]) -> Vec<SectionRecord> {
    sections
        .iter()
        .enumerate()
        .filter_map(|(position, raw)| match SectionRecord::from_value(raw) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::warn!(
                    position,
                    reason = %reason,
                    record = %raw,
                    "Dropping invalid CMS section"
                );
                None
            }
        })
        .collect()
}

/// Outer `<section>` element carrying the id and a class derived from the tag.
fn wrap(id: u64, component: &str, inner: &str) -> String {
    format!(
        "<section class=\"section section--{}\" data-section-id=\"{}\">\n{}\n</section>",
        css_name(component),
        id,
        inner
    )
}

/// `sections.rich-text` -> `rich-text`, limited to `[a-z0-9-]`.
fn css_name(component: &str) -> String {
    let name = component.rsplit('.').next().unwrap_or(component);
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}
